//! Trimming of the record buffer to its populated length.

use super::records::RecordBuffer;
use crate::config::TrimStrategy;
use crate::error::{HplError, Result};
use tracing::debug;

/// Number of records to keep under the given strategy.
///
/// `RecordCount` trusts the decoder's count. `FirstMissingTime` cuts at the
/// first record whose decimal time is NaN, so a gap ends the dataset even
/// when later records are populated.
pub fn trimmed_len(buffer: &RecordBuffer, strategy: TrimStrategy) -> Result<usize> {
    let len = match strategy {
        TrimStrategy::RecordCount => buffer.len(),
        TrimStrategy::FirstMissingTime => buffer
            .decimal_time()
            .iter()
            .position(|hours| hours.is_nan())
            .unwrap_or(buffer.len()),
    };

    if len == 0 {
        return Err(HplError::EmptyFile);
    }
    if len < buffer.len() {
        debug!(
            "Trimming {} records to {} at first missing time",
            buffer.len(),
            len
        );
    }

    Ok(len)
}

/// Cut the buffer down to its populated records
pub fn trim(buffer: &mut RecordBuffer, strategy: TrimStrategy) -> Result<usize> {
    let len = trimmed_len(buffer, strategy)?;
    buffer.truncate(len);
    Ok(len)
}
