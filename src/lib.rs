//! HPL Processor Library
//!
//! A Rust library for decoding Doppler wind lidar `.hpl` text files into a
//! labeled, time-indexed dataset.
//!
//! This library provides tools for:
//! - Parsing the fixed-layout header and its label lines
//! - Decoding record groups (one scalar line plus one line per range gate)
//! - Profile and summary file variants through one decoder
//! - Reconstructing absolute timestamps from the header date and decimal hours
//! - Converting the decoded dataset into polars frames
//!
//! ```no_run
//! use hpl_processor::{DecodeConfig, decode_file};
//! use std::path::Path;
//!
//! let dataset = decode_file(Path::new("Stare_116_20210315_13.hpl"), &DecodeConfig::default())?;
//! println!("{} records x {} gates", dataset.time_len(), dataset.range_gate_len());
//! # Ok::<(), hpl_processor::HplError>(())
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod header;
pub mod lines;
pub mod models;

// Re-export commonly used types
pub use config::{DecodeConfig, TimeConversion, TrimStrategy};
pub use dataset::{Grid, LidarDataset, Variable, VariableData};
pub use decoder::HplDecoder;
pub use error::{HplError, Result};
pub use header::{HeaderInfo, RawHeader};
pub use models::{DecodeStats, FormatDescriptor, FormatVariant, GateTally};

use std::io::BufRead;
use std::path::Path;

/// Decode one HPL stream positioned at its first header line
pub fn decode_reader<R: BufRead>(reader: R, config: &DecodeConfig) -> Result<LidarDataset> {
    HplDecoder::new(config.clone()).decode(reader)
}

/// Decode one HPL file from disk
pub fn decode_file(path: &Path, config: &DecodeConfig) -> Result<LidarDataset> {
    HplDecoder::new(config.clone()).decode_file(path)
}
