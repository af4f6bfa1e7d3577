//! Application constants for the HPL processor
//!
//! File layout constants, header keys, and the fixed labels used for the
//! decoded dataset's dimensions and variables.

// =============================================================================
// File Layout
// =============================================================================

/// Number of `Key: Value` lines at the top of every file
pub const HEADER_LINE_COUNT: usize = 11;

/// Number of label/unit lines following the header fields
pub const LABEL_LINE_COUNT: usize = 6;

/// Minimum whitespace-separated tokens on a gate line
pub const GATE_LINE_MIN_TOKENS: usize = 4;

/// Largest gate count accepted from a header
pub const MAX_GATES: usize = 100_000;

/// Records reserved up front when no limit is configured
pub const DEFAULT_INITIAL_CAPACITY: usize = 1_024;

/// Prefix of the label line describing the per-record scalar columns
pub const SCALAR_LABEL_PREFIX: &str = "Data line 1";

// =============================================================================
// Header Keys
// =============================================================================

pub mod header_keys {
    pub const FILENAME: &str = "Filename";
    pub const SYSTEM_ID: &str = "System ID";
    pub const NUMBER_OF_GATES: &str = "Number of gates";
    pub const RANGE_GATE_LENGTH: &str = "Range gate length (m)";
    pub const SCAN_TYPE: &str = "Scan type";
    pub const START_TIME: &str = "Start time";

    /// Keys that must be present for decoding to proceed
    pub const REQUIRED: &[&str] = &[NUMBER_OF_GATES, RANGE_GATE_LENGTH, START_TIME];
}

// =============================================================================
// Output Labels
// =============================================================================

/// Dimension names
pub mod dims {
    pub const TIME: &str = "time";
    pub const RANGE_GATE: &str = "range_gate";

    pub const TIME_ONLY: &[&str] = &[TIME];
    pub const RANGE_GATE_ONLY: &[&str] = &[RANGE_GATE];
    pub const TIME_BY_GATE: &[&str] = &[TIME, RANGE_GATE];
}

/// Variable and attribute names
pub mod labels {
    pub const DECIMAL_TIME: &str = "Decimal time (hours)";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const AZIMUTH: &str = "Azimuth (degrees)";
    pub const ELEVATION: &str = "Elevation (degrees)";
    pub const PITCH: &str = "Pitch (degrees)";
    pub const ROLL: &str = "Roll (degrees)";
    pub const DOPPLER: &str = "Doppler";
    pub const INTENSITY: &str = "Intensity";
    pub const BETA: &str = "Beta";
    pub const RANGE_GATE_LENGTH: &str = super::header_keys::RANGE_GATE_LENGTH;
}
