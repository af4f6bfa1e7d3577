//! Record stream decoding.
//!
//! After the header, a file is a run of record groups: one scalar line
//! followed by one line per range gate. Groups are read until a blank line
//! or end of input and appended to a growable [`RecordBuffer`].

use crate::constants::GATE_LINE_MIN_TOKENS;
use crate::error::{HplError, Result};
use crate::lines::LineReader;
use crate::models::{DecodeStats, FormatDescriptor, GateTally, ScalarField};
use std::io::BufRead;
use tracing::{debug, trace};

/// Growable per-record and per-gate arrays for one file
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBuffer {
    num_gates: usize,
    max_records: Option<usize>,
    pub(crate) decimal_time: Vec<f64>,
    pub(crate) azimuth: Vec<f64>,
    pub(crate) elevation: Vec<f64>,
    pub(crate) pitch: Vec<f64>,
    pub(crate) roll: Vec<f64>,
    /// Row-major `[records × num_gates]`
    pub(crate) doppler: Vec<f64>,
    pub(crate) intensity: Vec<f64>,
    pub(crate) beta: Vec<f64>,
    /// Line each record's scalar line was read from
    pub(crate) record_lines: Vec<usize>,
    /// Gate line counts of each record
    pub(crate) tallies: Vec<GateTally>,
}

impl RecordBuffer {
    /// Reserve room for `reserve_records` scalar rows.
    ///
    /// Gate grids start empty and grow one record at a time, so a large
    /// declared gate count costs nothing until records arrive.
    pub fn new(num_gates: usize, reserve_records: usize, max_records: Option<usize>) -> Self {
        Self {
            num_gates,
            max_records,
            decimal_time: Vec::with_capacity(reserve_records),
            azimuth: Vec::with_capacity(reserve_records),
            elevation: Vec::with_capacity(reserve_records),
            pitch: Vec::with_capacity(reserve_records),
            roll: Vec::with_capacity(reserve_records),
            doppler: Vec::new(),
            intensity: Vec::new(),
            beta: Vec::new(),
            record_lines: Vec::with_capacity(reserve_records),
            tallies: Vec::with_capacity(reserve_records),
        }
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.decimal_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decimal_time.is_empty()
    }

    pub fn num_gates(&self) -> usize {
        self.num_gates
    }

    pub fn decimal_time(&self) -> &[f64] {
        &self.decimal_time
    }

    pub fn record_lines(&self) -> &[usize] {
        &self.record_lines
    }

    pub fn tallies(&self) -> &[GateTally] {
        &self.tallies
    }

    /// Doppler values of one record, indexed by gate
    pub fn doppler_row(&self, record: usize) -> &[f64] {
        let start = record * self.num_gates;
        &self.doppler[start..start + self.num_gates]
    }

    /// Append a record with every value missing and return its index
    fn open_record(&mut self, line: usize) -> Result<usize> {
        let index = self.len();
        if let Some(capacity) = self.max_records {
            if index >= capacity {
                return Err(HplError::CapacityExceeded { capacity, line });
            }
        }

        self.decimal_time.push(f64::NAN);
        self.azimuth.push(f64::NAN);
        self.elevation.push(f64::NAN);
        self.pitch.push(f64::NAN);
        self.roll.push(f64::NAN);
        let cells = self.doppler.len() + self.num_gates;
        self.doppler.resize(cells, f64::NAN);
        self.intensity.resize(cells, f64::NAN);
        self.beta.resize(cells, f64::NAN);
        self.record_lines.push(line);
        self.tallies.push(GateTally::default());

        Ok(index)
    }

    fn set_scalar(&mut self, record: usize, field: ScalarField, value: f64) {
        let column = match field {
            ScalarField::DecimalTime => &mut self.decimal_time,
            ScalarField::Azimuth => &mut self.azimuth,
            ScalarField::Elevation => &mut self.elevation,
            ScalarField::Pitch => &mut self.pitch,
            ScalarField::Roll => &mut self.roll,
        };
        column[record] = value;
    }

    fn set_gate(&mut self, record: usize, gate: &GateValues) {
        let cell = record * self.num_gates + gate.index;
        self.doppler[cell] = gate.doppler;
        self.intensity[cell] = gate.intensity;
        self.beta[cell] = gate.beta;
    }

    /// Keep only the first `len` records
    pub fn truncate(&mut self, len: usize) {
        let cells = len * self.num_gates;
        self.decimal_time.truncate(len);
        self.azimuth.truncate(len);
        self.elevation.truncate(len);
        self.pitch.truncate(len);
        self.roll.truncate(len);
        self.doppler.truncate(cells);
        self.intensity.truncate(cells);
        self.beta.truncate(cells);
        self.record_lines.truncate(len);
        self.tallies.truncate(len);
    }
}

/// One parsed gate line
#[derive(Debug, Clone, Copy, PartialEq)]
struct GateValues {
    index: usize,
    doppler: f64,
    intensity: f64,
    beta: f64,
}

/// Decode record groups until a blank line or end of input.
///
/// Values land in `buffer`; the returned statistics report how many records
/// were decoded, which is the authoritative record count for trimming.
pub fn decode_records<R: BufRead>(
    lines: &mut LineReader<R>,
    descriptor: &FormatDescriptor,
    buffer: &mut RecordBuffer,
) -> Result<DecodeStats> {
    let num_gates = buffer.num_gates();
    let mut stats = DecodeStats::default();
    let mut seen = vec![false; num_gates];
    let mut scalars = Vec::with_capacity(descriptor.scalar_count());

    loop {
        let record = buffer.len();
        let line_num = match lines.next_line()? {
            None => break,
            Some((line_num, text)) => {
                if !parse_scalar_line(text, descriptor, line_num, record, &mut scalars)? {
                    break;
                }
                line_num
            }
        };

        buffer.open_record(line_num)?;
        for (field, value) in descriptor.scalar_fields.iter().zip(&scalars) {
            buffer.set_scalar(record, *field, *value);
        }

        seen.fill(false);
        let mut tally = GateTally::default();
        for received in 0..num_gates {
            let expected = lines.lines_read() + 1;
            let gate = match lines.next_line()? {
                None => {
                    return Err(HplError::malformed_record(
                        expected,
                        record,
                        format!(
                            "unexpected end of input after {} of {} gate lines",
                            received, num_gates
                        ),
                    ));
                }
                Some((gate_line, text)) => parse_gate_line(text, num_gates, gate_line, record)?,
            };

            if seen[gate.index] {
                tally.duplicate_gate_lines += 1;
                debug!(
                    "Record {} repeats gate {} at line {}",
                    record, gate.index, expected
                );
            }
            seen[gate.index] = true;
            buffer.set_gate(record, &gate);
            tally.gate_lines += 1;
        }

        tally.missing_gate_cells = seen.iter().filter(|filled| !**filled).count();
        buffer.tallies[record] = tally;
        stats.add_record(&tally);
        trace!("Decoded record {} from line {}", record, line_num);
    }

    stats.lines_read = lines.lines_read();
    debug!(
        "Decoded {} records ({} gate lines) ending at line {}",
        stats.records, stats.gate_lines, stats.lines_read
    );

    Ok(stats)
}

/// Parse a scalar line into `values`; returns false for a blank line
fn parse_scalar_line(
    text: &str,
    descriptor: &FormatDescriptor,
    line: usize,
    record: usize,
    values: &mut Vec<f64>,
) -> Result<bool> {
    values.clear();
    let mut tokens = text.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return Ok(false);
    }

    for field in descriptor.scalar_fields {
        let token = tokens.next().ok_or_else(|| {
            HplError::malformed_record(
                line,
                record,
                format!(
                    "expected {} values on scalar line, found {}",
                    descriptor.scalar_count(),
                    values.len()
                ),
            )
        })?;
        values.push(parse_float(token, field.label(), line, record)?);
    }

    Ok(true)
}

fn parse_gate_line(text: &str, num_gates: usize, line: usize, record: usize) -> Result<GateValues> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < GATE_LINE_MIN_TOKENS {
        return Err(HplError::malformed_record(
            line,
            record,
            format!(
                "expected {} values on gate line, found {}",
                GATE_LINE_MIN_TOKENS,
                tokens.len()
            ),
        ));
    }

    let declared = tokens[0].parse::<i64>().map_err(|e| {
        HplError::malformed_record(
            line,
            record,
            format!("invalid gate index '{}': {}", tokens[0], e),
        )
    })?;
    let index = usize::try_from(declared)
        .ok()
        .filter(|index| *index < num_gates)
        .ok_or_else(|| {
            HplError::malformed_record(
                line,
                record,
                format!(
                    "gate index {} outside range 0..{}",
                    declared, num_gates
                ),
            )
        })?;

    Ok(GateValues {
        index,
        doppler: parse_float(tokens[1], "Doppler", line, record)?,
        intensity: parse_float(tokens[2], "Intensity", line, record)?,
        beta: parse_float(tokens[3], "Beta", line, record)?,
    })
}

fn parse_float(token: &str, field: &str, line: usize, record: usize) -> Result<f64> {
    token.parse::<f64>().map_err(|e| {
        HplError::malformed_record(
            line,
            record,
            format!("invalid {} value '{}': {}", field, token, e),
        )
    })
}
