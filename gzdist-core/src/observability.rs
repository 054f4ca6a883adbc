/*!
Logging setup for gzdist binaries.

Console progress belongs to stdout, so every log event is written to stderr.
*/

use tracing::subscriber::set_global_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry as TracingRegistry};

use crate::{GzdistError, Result};

/// Output format of log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line events
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Build the filter for the given verbosity
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
pub fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global tracing subscriber
///
/// # Arguments
/// * `format` - Text or JSON event formatting
/// * `verbose` - Lower the default level to `debug`
///
/// # Returns
/// An error if a global subscriber has already been installed
pub fn init_logging(format: LogFormat, verbose: bool) -> Result<()> {
    let filter = log_filter(verbose);

    let result = match format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            set_global_default(TracingRegistry::default().with(filter).with(fmt_layer))
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(false)
                .with_writer(std::io::stderr);
            set_global_default(TracingRegistry::default().with(filter).with(fmt_layer))
        }
    };

    result.map_err(|e| {
        GzdistError::storage(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    tracing::debug!(?format, "Logging initialized");
    Ok(())
}
