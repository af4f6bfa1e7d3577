//! HPL file decoder.
//!
//! Runs the decoding stages in order over one stream:
//! header parsing, record stream decoding, trimming, time axis
//! reconstruction, and dataset assembly. Each call owns its reader and
//! buffers; nothing is shared between calls.

pub mod records;
pub mod time_axis;
pub mod trim;

#[cfg(test)]
pub mod tests;

use self::records::{RecordBuffer, decode_records};
use self::time_axis::build_time_axis;

use crate::config::DecodeConfig;
use crate::dataset::LidarDataset;
use crate::error::{HplError, Result};
use crate::header::parse_header;
use crate::lines::LineReader;
use crate::models::FormatVariant;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Decoder for HPL profile and summary files
#[derive(Debug, Clone, Default)]
pub struct HplDecoder {
    config: DecodeConfig,
}

impl HplDecoder {
    /// Create a decoder with the given configuration
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode a file from disk
    pub fn decode_file(&self, path: &Path) -> Result<LidarDataset> {
        let file = File::open(path).map_err(|source| HplError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = self.decode(BufReader::new(file))?;
        info!(
            "Decoded {}: {} records x {} gates ({})",
            path.display(),
            dataset.time_len(),
            dataset.range_gate_len(),
            dataset.format
        );
        Ok(dataset)
    }

    /// Decode a complete file from a buffered reader positioned at its start
    pub fn decode<R: BufRead>(&self, reader: R) -> Result<LidarDataset> {
        self.config.validate()?;
        let mut lines = LineReader::new(reader);

        // Step 1: header fields and label lines
        let header = parse_header(&mut lines)?;
        let info = header.validate()?;
        let variant = self.resolve_variant(header.labels());
        let descriptor = variant.descriptor();
        debug!(
            "Header: {} gates of {} m from {} ({} format)",
            info.num_gates, info.range_gate_length_m, info.start_date, variant
        );

        // Step 2: record groups until blank line or end of input
        let mut buffer = RecordBuffer::new(
            info.num_gates,
            self.config.reserved_records(),
            self.config.max_records,
        );
        let decoded = decode_records(&mut lines, &descriptor, &mut buffer)?;

        // Step 3: cut to the populated records; stats follow the kept rows
        let kept = trim::trim(&mut buffer, self.config.trim)?;
        let stats = decoded.rebase(&buffer.tallies()[..kept]);
        if stats.missing_gate_cells > 0 {
            warn!(
                "{} gate cells never appeared and are left missing",
                stats.missing_gate_cells
            );
        }

        // Step 4: absolute timestamps
        let timestamps = build_time_axis(
            info.start_date,
            buffer.decimal_time(),
            buffer.record_lines(),
            self.config.time_conversion,
        )?;

        // Step 5: labeled dataset
        Ok(LidarDataset::assemble(
            &header,
            &info,
            &descriptor,
            buffer,
            timestamps,
            stats,
        ))
    }

    fn resolve_variant(&self, labels: &[String]) -> FormatVariant {
        if let Some(variant) = self.config.format {
            return variant;
        }
        FormatVariant::detect_from_labels(labels).unwrap_or_else(|| {
            debug!("Format not recognised from labels, assuming profile");
            FormatVariant::default()
        })
    }
}
