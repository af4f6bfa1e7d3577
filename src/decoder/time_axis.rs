//! Absolute time axis reconstruction.
//!
//! Each record carries its time of day as decimal hours; the calendar date
//! comes from the header. Timestamps are naive (no zone is declared by the
//! file) with microsecond resolution.

use crate::config::TimeConversion;
use crate::error::{HplError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::warn;

const MICROS_PER_HOUR: f64 = 3_600.0 * 1_000_000.0;

/// Convert decimal hours to whole microseconds.
///
/// Returns `None` for non-finite input or values outside the `i64` range.
pub fn hours_to_micros(hours: f64, conversion: TimeConversion) -> Option<i64> {
    if !hours.is_finite() {
        return None;
    }

    let micros = hours * MICROS_PER_HOUR;
    let micros = match conversion {
        TimeConversion::Truncate => micros.trunc(),
        TimeConversion::Round => micros.round(),
    };

    if micros < i64::MIN as f64 || micros >= i64::MAX as f64 {
        return None;
    }
    Some(micros as i64)
}

/// Build one timestamp per record from the start date and decimal hours.
///
/// `record_lines` gives the source line of each record for error reporting.
pub fn build_time_axis(
    start_date: NaiveDate,
    decimal_hours: &[f64],
    record_lines: &[usize],
    conversion: TimeConversion,
) -> Result<Vec<NaiveDateTime>> {
    let midnight = start_date.and_time(NaiveTime::MIN);
    let mut timestamps = Vec::with_capacity(decimal_hours.len());

    for (record, &hours) in decimal_hours.iter().enumerate() {
        let line = record_lines.get(record).copied().unwrap_or_default();
        let timestamp = hours_to_micros(hours, conversion)
            .and_then(|micros| midnight.checked_add_signed(TimeDelta::microseconds(micros)))
            .ok_or_else(|| {
                HplError::malformed_record(
                    line,
                    record,
                    format!("decimal time {} cannot be converted to a timestamp", hours),
                )
            })?;

        if let Some(previous) = timestamps.last() {
            if timestamp < *previous {
                warn!(
                    "Time decreases at record {} (line {}): {} after {}",
                    record, line, timestamp, previous
                );
            }
        }
        timestamps.push(timestamp);
    }

    Ok(timestamps)
}
