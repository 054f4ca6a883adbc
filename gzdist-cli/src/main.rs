/*!
gzdist CLI - precompress a build output directory.

Mirrors every file of the source tree into the destination tree as a `.gz`
artifact, or checks an existing destination against its source.
*/

use clap::{Parser, Subcommand, ValueEnum};
use gzdist_core::{
    create_default_compressor,
    observability::{init_logging, LogFormat},
    CompressConfig, RunSummary, VerifyReport, VerifyStatus, DEFAULT_DESTINATION_DIR,
    DEFAULT_SOURCE_DIR,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{Table, Tabled};
use tracing::{debug, error, info};

#[derive(Parser)]
#[command(name = "gzdist")]
#[command(about = "Precompress build output into a mirrored gzip tree")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log event format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormatArg,

    /// Build output directory to compress
    #[arg(short, long, global = true, env = "GZDIST_SOURCE", default_value = DEFAULT_SOURCE_DIR)]
    source: PathBuf,

    /// Directory that is wiped and refilled with artifacts
    #[arg(short, long, global = true, env = "GZDIST_DEST", default_value = DEFAULT_DESTINATION_DIR)]
    dest: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the destination from the source (default)
    Compress {
        /// Print the run summary as JSON after the progress output
        #[arg(long)]
        json: bool,
    },
    /// Check that the destination matches the source
    Verify,
}

#[derive(Tabled)]
struct VerifyRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Artifact")]
    artifact: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format.into(), cli.verbose) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), anyhow::Error> {
    let config = CompressConfig::new(cli.source, cli.dest);
    debug!(?config, "Resolved configuration");

    match cli.command.unwrap_or(Commands::Compress { json: false }) {
        Commands::Compress { json } => compress(config, json),
        Commands::Verify => verify(config),
    }
}

fn compress(config: CompressConfig, json: bool) -> Result<(), anyhow::Error> {
    let compressor = create_default_compressor(config);

    let summary = compressor.run_with_progress(|artifact| {
        println!(
            "Compressed: {} -> {}",
            artifact.source.display(),
            artifact.destination.display()
        );
    })?;

    println!("Compression completed. Processed {} files.", summary.files);
    info!("{}", describe_savings(&summary));

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn verify(config: CompressConfig) -> Result<(), anyhow::Error> {
    let compressor = create_default_compressor(config);
    let report = compressor.verify()?;

    println!("{}", Table::new(verify_rows(&report)));

    if report.is_clean() {
        println!("✓ {} artifacts verified", report.entries.len());
        Ok(())
    } else {
        error!(
            failures = report.failures(),
            stale = report.stale.len(),
            "Destination does not match source"
        );
        Err(anyhow::anyhow!(
            "verification failed: {} bad artifacts, {} stale artifacts",
            report.failures(),
            report.stale.len()
        ))
    }
}

fn verify_rows(report: &VerifyReport) -> Vec<VerifyRow> {
    let mut rows: Vec<VerifyRow> = report
        .entries
        .iter()
        .map(|entry| VerifyRow {
            source: entry.source.display().to_string(),
            artifact: entry.artifact.display().to_string(),
            status: match &entry.status {
                VerifyStatus::Ok => "ok".to_string(),
                VerifyStatus::Missing => "missing".to_string(),
                VerifyStatus::Corrupt { reason } => format!("corrupt: {reason}"),
                VerifyStatus::Mismatch { .. } => "content mismatch".to_string(),
            },
        })
        .collect();

    rows.extend(report.stale.iter().map(|stale| VerifyRow {
        source: "-".to_string(),
        artifact: stale.display().to_string(),
        status: "stale".to_string(),
    }));
    rows
}

fn describe_savings(summary: &RunSummary) -> String {
    match summary.compression_ratio() {
        Some(ratio) => format!(
            "{} -> {} ({:.1}% of original)",
            format_size(summary.input_bytes),
            format_size(summary.output_bytes),
            ratio * 100.0
        ),
        None => "all inputs were empty".to_string(),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
