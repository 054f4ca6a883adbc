/*!
Compression adapters for build artifacts.

Artifacts are served straight to browsers with `Content-Encoding: gzip`, so the
only production adapter is gzip at maximum ratio. Output must be reproducible:
identical input bytes always give identical compressed bytes.
*/

use crate::{GzdistError, Result};
use flate2::{read::GzDecoder, Compression, GzBuilder};
use std::io::{Read, Write};

/// Compression abstraction for artifact data
///
/// The engine only talks to this trait, which keeps the walk and storage
/// logic independent of the codec and lets tests inject failing codecs.
pub trait CompressionAdapter {
    /// Compress the input data
    ///
    /// # Arguments
    /// * `data` - The data to compress
    ///
    /// # Returns
    /// The compressed data or an error
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress the input data
    ///
    /// # Arguments
    /// * `compressed_data` - The compressed data to decompress
    ///
    /// # Returns
    /// The decompressed data or an error
    fn decompress(&self, compressed_data: &[u8]) -> Result<Vec<u8>>;

    /// Get the name of the compression algorithm
    fn algorithm_name(&self) -> &str;

    /// Suffix appended to every artifact file name, including the dot
    fn file_suffix(&self) -> &str;
}

/// Gzip compression adapter
///
/// Fixed at level 9 with a zeroed modification time and no file name or
/// comment in the header, so repeated runs produce byte-identical artifacts.
///
/// # Example
/// ```rust
/// use gzdist_core::{CompressionAdapter, GzipCompressor};
///
/// let compressor = GzipCompressor::new();
/// let data = b"body { margin: 0 } body { margin: 0 }";
/// let compressed = compressor.compress(data)?;
/// let decompressed = compressor.decompress(&compressed)?;
/// assert_eq!(data, &decompressed[..]);
/// # Ok::<(), gzdist_core::GzdistError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GzipCompressor {
    compression_level: Compression,
}

impl GzipCompressor {
    /// Gzip header modification time written into every artifact
    pub const MTIME: u32 = 0;

    /// Create a gzip compressor at maximum compression (level 9)
    pub fn new() -> Self {
        Self {
            compression_level: Compression::best(),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionAdapter for GzipCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzBuilder::new()
            .mtime(Self::MTIME)
            .write(Vec::with_capacity(data.len() / 2), self.compression_level);

        encoder.write_all(data).map_err(|e| {
            GzdistError::compression(format!("Failed to write data for compression: {e}"))
        })?;

        encoder
            .finish()
            .map_err(|e| GzdistError::compression(format!("Failed to finish compression: {e}")))
    }

    fn decompress(&self, compressed_data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(compressed_data);
        let mut decompressed = Vec::new();

        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| GzdistError::compression(format!("Failed to decompress data: {e}")))?;

        Ok(decompressed)
    }

    fn algorithm_name(&self) -> &str {
        "gzip"
    }

    fn file_suffix(&self) -> &str {
        ".gz"
    }
}
