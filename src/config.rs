//! Configuration management and validation.
//!
//! Provides the decode configuration: which format variant to read, how the
//! record buffer is trimmed, how decimal hours become timestamps, and an
//! optional bound on the number of records held in memory.

use crate::constants::DEFAULT_INITIAL_CAPACITY;
use crate::error::{HplError, Result};
use crate::models::FormatVariant;
use serde::{Deserialize, Serialize};

/// How the decoded record buffer is cut down to its populated length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TrimStrategy {
    /// Use the record count reported by the decoder
    #[default]
    RecordCount,
    /// Cut at the first record whose decimal time is missing (NaN)
    FirstMissingTime,
}

/// Conversion of decimal hours to whole microseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimeConversion {
    /// Truncate toward zero
    #[default]
    Truncate,
    /// Round to the nearest microsecond
    Round,
}

/// Decoder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Format variant to decode; detected from the label lines when unset
    pub format: Option<FormatVariant>,

    /// Trimming strategy for the record buffer
    pub trim: TrimStrategy,

    /// Decimal-hour conversion mode
    pub time_conversion: TimeConversion,

    /// Upper bound on records per file (None = unbounded)
    pub max_records: Option<usize>,

    /// Records reserved before decoding starts
    pub initial_capacity: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            format: None,
            trim: TrimStrategy::RecordCount,
            time_conversion: TimeConversion::Truncate,
            max_records: None,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl DecodeConfig {
    /// Force a specific format variant
    pub fn with_format(mut self, format: FormatVariant) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the trimming strategy
    pub fn with_trim(mut self, trim: TrimStrategy) -> Self {
        self.trim = trim;
        self
    }

    /// Set the decimal-hour conversion mode
    pub fn with_time_conversion(mut self, time_conversion: TimeConversion) -> Self {
        self.time_conversion = time_conversion;
        self
    }

    /// Bound the number of records decoded per file
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Set the number of records reserved up front
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Records to reserve, never more than the configured limit
    pub fn reserved_records(&self) -> usize {
        match self.max_records {
            Some(limit) => self.initial_capacity.min(limit),
            None => self.initial_capacity,
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_records == Some(0) {
            return Err(HplError::configuration(
                "max_records must be greater than zero",
            ));
        }
        Ok(())
    }
}
