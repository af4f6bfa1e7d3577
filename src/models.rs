//! Core data structures and types for HPL decoding.
//!
//! Defines the two file format variants, the descriptor the decoder is
//! parameterized by, and the statistics reported for each decoded file.

use crate::constants::{SCALAR_LABEL_PREFIX, labels};
use serde::{Deserialize, Serialize};
use std::fmt;

/// File format variants produced by the instrument
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FormatVariant {
    /// Scalar line carries time, azimuth, elevation, pitch and roll
    #[default]
    Profile,
    /// Scalar line carries time, azimuth and elevation only
    Summary,
}

impl FormatVariant {
    /// Detect the variant from the label lines that follow the header.
    ///
    /// The "Data line 1" label names the scalar columns; attitude columns
    /// (pitch and roll) only appear in the profile variant.
    pub fn detect_from_labels<S: AsRef<str>>(label_lines: &[S]) -> Option<Self> {
        let scalar_label = label_lines
            .iter()
            .map(|line| line.as_ref())
            .find(|line| line.trim_start().starts_with(SCALAR_LABEL_PREFIX))?;

        if scalar_label.contains("Pitch") && scalar_label.contains("Roll") {
            Some(FormatVariant::Profile)
        } else if scalar_label.contains("Decimal time") {
            Some(FormatVariant::Summary)
        } else {
            None
        }
    }

    /// Field layout for this variant
    pub fn descriptor(self) -> FormatDescriptor {
        match self {
            FormatVariant::Profile => FormatDescriptor {
                variant: self,
                scalar_fields: &[
                    ScalarField::DecimalTime,
                    ScalarField::Azimuth,
                    ScalarField::Elevation,
                    ScalarField::Pitch,
                    ScalarField::Roll,
                ],
            },
            FormatVariant::Summary => FormatDescriptor {
                variant: self,
                scalar_fields: &[
                    ScalarField::DecimalTime,
                    ScalarField::Azimuth,
                    ScalarField::Elevation,
                ],
            },
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatVariant::Profile => write!(f, "profile"),
            FormatVariant::Summary => write!(f, "summary"),
        }
    }
}

/// Per-record scalar columns, in the order they may appear on a scalar line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarField {
    DecimalTime,
    Azimuth,
    Elevation,
    Pitch,
    Roll,
}

impl ScalarField {
    /// Output variable name
    pub fn label(self) -> &'static str {
        match self {
            ScalarField::DecimalTime => labels::DECIMAL_TIME,
            ScalarField::Azimuth => labels::AZIMUTH,
            ScalarField::Elevation => labels::ELEVATION,
            ScalarField::Pitch => labels::PITCH,
            ScalarField::Roll => labels::ROLL,
        }
    }
}

/// Field layout the record decoder reads a file with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub variant: FormatVariant,
    pub scalar_fields: &'static [ScalarField],
}

impl FormatDescriptor {
    /// Number of leading tokens consumed from each scalar line
    pub fn scalar_count(&self) -> usize {
        self.scalar_fields.len()
    }

    /// Whether pitch and roll are part of the record
    pub fn has_attitude(&self) -> bool {
        self.scalar_fields.contains(&ScalarField::Pitch)
            && self.scalar_fields.contains(&ScalarField::Roll)
    }
}

/// Gate line bookkeeping for one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateTally {
    pub gate_lines: usize,
    pub duplicate_gate_lines: usize,
    pub missing_gate_cells: usize,
}

/// Statistics for the records of one decoded file.
///
/// After trimming, the counts cover the records kept in the dataset only;
/// `trimmed_records` says how many decoded records were cut.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Records covered by these statistics
    pub records: usize,
    /// Decoded records dropped by trimming
    pub trimmed_records: usize,
    /// Total lines consumed, header included
    pub lines_read: usize,
    /// Gate lines consumed
    pub gate_lines: usize,
    /// Gate lines whose index repeated one already seen in the same record
    pub duplicate_gate_lines: usize,
    /// Cells left missing because their gate index never appeared
    pub missing_gate_cells: usize,
}

impl DecodeStats {
    /// Count one decoded record
    pub fn add_record(&mut self, tally: &GateTally) {
        self.records += 1;
        self.gate_lines += tally.gate_lines;
        self.duplicate_gate_lines += tally.duplicate_gate_lines;
        self.missing_gate_cells += tally.missing_gate_cells;
    }

    /// Recount over the leading records that survived trimming
    pub fn rebase(&self, kept: &[GateTally]) -> Self {
        let mut stats = DecodeStats {
            trimmed_records: self.records.saturating_sub(kept.len()),
            lines_read: self.lines_read,
            ..DecodeStats::default()
        };
        for tally in kept {
            stats.add_record(tally);
        }
        stats
    }

    /// True when every record filled every gate exactly once
    pub fn is_complete(&self) -> bool {
        self.duplicate_gate_lines == 0 && self.missing_gate_cells == 0
    }
}
