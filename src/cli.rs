//! Command-line interface components.

use crate::config::{DecodeConfig, TimeConversion, TrimStrategy};
use crate::constants::header_keys;
use crate::dataset::LidarDataset;
use crate::decoder::HplDecoder;
use crate::error::HplError;
use crate::models::FormatVariant;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "hpl-processor")]
#[command(about = "Decode Doppler wind lidar HPL files into time-indexed datasets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// HPL files to decode
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// File format variant
    #[arg(long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// How the record buffer is trimmed
    #[arg(long, value_enum, default_value = "record-count")]
    pub trim: TrimStrategy,

    /// Conversion of decimal hours to microseconds
    #[arg(long = "time-conversion", value_enum, default_value = "truncate")]
    pub time_conversion: TimeConversion,

    /// Fail files holding more than this many records
    #[arg(long = "max-records", value_name = "N")]
    pub max_records: Option<usize>,

    /// Print the per-record frame for each decoded file
    #[arg(long = "show-frame")]
    pub show_frame: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Format selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Detect from the label lines
    Auto,
    Profile,
    Summary,
}

impl FormatArg {
    pub fn variant(self) -> Option<FormatVariant> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Profile => Some(FormatVariant::Profile),
            FormatArg::Summary => Some(FormatVariant::Summary),
        }
    }
}

impl Args {
    /// Build the decoder configuration from the flags
    pub fn to_config(&self) -> DecodeConfig {
        let mut config = DecodeConfig::default()
            .with_trim(self.trim)
            .with_time_conversion(self.time_conversion);
        if let Some(variant) = self.format.variant() {
            config = config.with_format(variant);
        }
        if let Some(max_records) = self.max_records {
            config = config.with_max_records(max_records);
        }
        config
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Outcome of one CLI run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_decoded: usize,
    pub files_failed: usize,
    pub records: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }
}

/// Set up structured logging to stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hpl_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Decode every file named on the command line, reporting each one.
///
/// Failures are printed and counted; the remaining files are still decoded.
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = args.to_config();
    config.validate().context("Invalid decoder options")?;
    let decoder = HplDecoder::new(config);
    debug!("Decoding {} files with {:?}", args.files.len(), decoder.config());
    let mut summary = RunSummary::default();

    for path in &args.files {
        match process_one(&decoder, path, args) {
            Ok(records) => {
                summary.files_decoded += 1;
                summary.records += records;
            }
            Err(error) => {
                summary.files_failed += 1;
                eprintln!(
                    "{} {}: {}",
                    "FAILED".red().bold(),
                    failure_location(path, &error),
                    error
                );
            }
        }
    }

    if !args.quiet {
        print_run_summary(&summary);
    }
    Ok(summary)
}

/// Decode, report and optionally print the frame of one file
fn process_one(decoder: &HplDecoder, path: &Path, args: &Args) -> crate::error::Result<usize> {
    let dataset = decoder.decode_file(path)?;
    if !args.quiet {
        print_dataset(path, &dataset);
    }
    if args.show_frame {
        println!("{}", dataset.to_time_frame()?);
    }
    Ok(dataset.time_len())
}

/// `path` or `path:line` when the error points at a line
fn failure_location(path: &Path, error: &HplError) -> String {
    match error.line() {
        Some(line) => format!("{}:{}", path.display(), line),
        None => path.display().to_string(),
    }
}

fn print_dataset(path: &Path, dataset: &LidarDataset) {
    println!("{} {}", "Decoded".bright_green().bold(), path.display());
    println!(
        "  {:<12} {} ({} records x {} gates)",
        "Format:",
        dataset.format.to_string().bright_yellow(),
        dataset.time_len(),
        dataset.range_gate_len()
    );
    if let Some(system_id) = dataset.attribute(header_keys::SYSTEM_ID) {
        println!("  {:<12} {}", "System ID:", system_id);
    }
    println!("  {:<12} {} m", "Gate length:", dataset.range_gate_length_m);
    if let (Some(first), Some(last)) = (dataset.timestamp.first(), dataset.timestamp.last()) {
        println!("  {:<12} {} .. {}", "Time span:", first, last);
    }
    if !dataset.stats.is_complete() {
        println!(
            "  {} {} duplicate gate lines, {} missing gate cells",
            "Warning:".yellow().bold(),
            dataset.stats.duplicate_gate_lines,
            dataset.stats.missing_gate_cells
        );
    }
}

fn print_run_summary(summary: &RunSummary) {
    let status = if summary.is_success() {
        "OK".bright_green().bold()
    } else {
        "ERRORS".red().bold()
    };
    println!(
        "{} {} decoded, {} failed, {} records",
        status, summary.files_decoded, summary.files_failed, summary.records
    );
}
