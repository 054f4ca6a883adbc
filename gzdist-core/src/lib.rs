/*!
# gzdist Core Engine

Precompresses a build output directory into a mirrored tree of gzip
artifacts, so a static file server can answer `Accept-Encoding: gzip`
without compressing on the fly.

- Recursive traversal of the source tree
- Deterministic, maximum-ratio gzip per file
- Full rebuild of the destination on every run
- Verification of an existing destination against its source

## Architecture

The engine depends on two ports:
- `CompressionAdapter` turns file bytes into artifact bytes
- `StorageAdapter` owns the destination tree

## Usage

```rust,no_run
use gzdist_core::{create_default_compressor, CompressConfig};

let compressor = create_default_compressor(CompressConfig::new("dist", "gzipped"));
let summary = compressor.run()?;
assert!(summary.files > 0);
# Ok::<(), gzdist_core::GzdistError>(())
```
*/

pub mod compression;
pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod storage;
pub mod walker;


pub use compression::{CompressionAdapter, GzipCompressor};
pub use config::{CompressConfig, DEFAULT_DESTINATION_DIR, DEFAULT_SOURCE_DIR};
pub use engine::{
    content_hash, create_default_compressor, ArtifactRecord, DistCompressor, RunSummary,
    VerifyEntry, VerifyReport, VerifyStatus,
};
pub use error::{GzdistError, Result};
pub use storage::{LocalFileStorage, StorageAdapter};
