//! Labeled output dataset for a decoded file.
//!
//! A [`LidarDataset`] has two dimensions, `time` and `range_gate`. Per-record
//! variables run along `time`; Doppler, intensity and beta run along both.
//! Variables are addressed by their fixed labels and can be converted to
//! polars frames for downstream analysis.

use crate::constants::{dims, header_keys, labels};
use crate::decoder::records::RecordBuffer;
use crate::error::Result;
use crate::header::{HeaderInfo, RawHeader};
use crate::models::{DecodeStats, FormatDescriptor, FormatVariant};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Dense row-major `[time × range_gate]` matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Grid {
    fn new(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        Self { rows, cols, values }
    }

    /// `(time, range_gate)` lengths
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Values of one record across all gates
    pub fn row(&self, record: usize) -> &[f64] {
        let start = record * self.cols;
        &self.values[start..start + self.cols]
    }

    pub fn get(&self, record: usize, gate: usize) -> Option<f64> {
        if record < self.rows && gate < self.cols {
            Some(self.values[record * self.cols + gate])
        } else {
            None
        }
    }

    /// All values in row-major order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Borrowed values of one dataset variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableData<'a> {
    Float(&'a [f64]),
    Timestamp(&'a [NaiveDateTime]),
    Grid(&'a Grid),
}

/// A named variable with its dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable<'a> {
    pub name: &'static str,
    pub dims: &'static [&'static str],
    pub data: VariableData<'a>,
}

/// Decoded lidar file: arrays, coordinates and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct LidarDataset {
    pub format: FormatVariant,
    pub decimal_time: Vec<f64>,
    /// Also the `time` coordinate
    pub timestamp: Vec<NaiveDateTime>,
    pub azimuth: Vec<f64>,
    pub elevation: Vec<f64>,
    /// Present for the profile variant only
    pub pitch: Option<Vec<f64>>,
    pub roll: Option<Vec<f64>>,
    pub doppler: Grid,
    pub intensity: Grid,
    pub beta: Grid,
    /// `range_gate` coordinate, 0..num_gates
    pub range_gate: Vec<u32>,
    pub range_gate_length_m: f64,
    /// Header fields copied verbatim
    pub attributes: BTreeMap<String, String>,
    pub stats: DecodeStats,
}

impl LidarDataset {
    /// Package trimmed buffers, timestamps and header metadata
    pub(crate) fn assemble(
        header: &RawHeader,
        info: &HeaderInfo,
        descriptor: &FormatDescriptor,
        buffer: RecordBuffer,
        timestamp: Vec<NaiveDateTime>,
        stats: DecodeStats,
    ) -> Self {
        let rows = buffer.len();
        let cols = buffer.num_gates();
        let has_attitude = descriptor.has_attitude();

        let attributes = header
            .fields()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self {
            format: descriptor.variant,
            decimal_time: buffer.decimal_time,
            timestamp,
            azimuth: buffer.azimuth,
            elevation: buffer.elevation,
            pitch: has_attitude.then_some(buffer.pitch),
            roll: has_attitude.then_some(buffer.roll),
            doppler: Grid::new(rows, cols, buffer.doppler),
            intensity: Grid::new(rows, cols, buffer.intensity),
            beta: Grid::new(rows, cols, buffer.beta),
            range_gate: (0..cols as u32).collect(),
            range_gate_length_m: info.range_gate_length_m,
            attributes,
            stats,
        }
    }

    /// Length of the `time` dimension
    pub fn time_len(&self) -> usize {
        self.timestamp.len()
    }

    /// Length of the `range_gate` dimension
    pub fn range_gate_len(&self) -> usize {
        self.range_gate.len()
    }

    /// Dimension names with their lengths
    pub fn dims(&self) -> [(&'static str, usize); 2] {
        [
            (dims::TIME, self.time_len()),
            (dims::RANGE_GATE, self.range_gate_len()),
        ]
    }

    /// Header attribute by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Look up a data variable by label
    pub fn variable(&self, name: &str) -> Option<Variable<'_>> {
        let (name, dims, data) = match name {
            labels::DECIMAL_TIME => (
                labels::DECIMAL_TIME,
                dims::TIME_ONLY,
                VariableData::Float(&self.decimal_time),
            ),
            labels::TIMESTAMP => (
                labels::TIMESTAMP,
                dims::TIME_ONLY,
                VariableData::Timestamp(&self.timestamp),
            ),
            labels::AZIMUTH => (
                labels::AZIMUTH,
                dims::TIME_ONLY,
                VariableData::Float(&self.azimuth),
            ),
            labels::ELEVATION => (
                labels::ELEVATION,
                dims::TIME_ONLY,
                VariableData::Float(&self.elevation),
            ),
            labels::PITCH => (
                labels::PITCH,
                dims::TIME_ONLY,
                VariableData::Float(self.pitch.as_deref()?),
            ),
            labels::ROLL => (
                labels::ROLL,
                dims::TIME_ONLY,
                VariableData::Float(self.roll.as_deref()?),
            ),
            labels::DOPPLER => (
                labels::DOPPLER,
                dims::TIME_BY_GATE,
                VariableData::Grid(&self.doppler),
            ),
            labels::INTENSITY => (
                labels::INTENSITY,
                dims::TIME_BY_GATE,
                VariableData::Grid(&self.intensity),
            ),
            labels::BETA => (
                labels::BETA,
                dims::TIME_BY_GATE,
                VariableData::Grid(&self.beta),
            ),
            _ => return None,
        };
        Some(Variable { name, dims, data })
    }

    /// All data variables present, in output order
    pub fn variables(&self) -> Vec<Variable<'_>> {
        [
            labels::DECIMAL_TIME,
            labels::TIMESTAMP,
            labels::AZIMUTH,
            labels::ELEVATION,
            labels::PITCH,
            labels::ROLL,
            labels::DOPPLER,
            labels::INTENSITY,
            labels::BETA,
        ]
        .into_iter()
        .filter_map(|name| self.variable(name))
        .collect()
    }

    fn time_series(&self, name: &str) -> Result<Series> {
        let micros: Vec<i64> = self
            .timestamp
            .iter()
            .map(|timestamp| timestamp.and_utc().timestamp_micros())
            .collect();
        Ok(Series::new(name.into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?)
    }

    /// One row per record: the `time` coordinate and every per-record variable
    pub fn to_time_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = vec![
            self.time_series(dims::TIME)?.into(),
            Column::new(labels::DECIMAL_TIME.into(), &self.decimal_time),
            Column::new(labels::AZIMUTH.into(), &self.azimuth),
            Column::new(labels::ELEVATION.into(), &self.elevation),
        ];
        if let Some(pitch) = &self.pitch {
            columns.push(Column::new(labels::PITCH.into(), pitch));
        }
        if let Some(roll) = &self.roll {
            columns.push(Column::new(labels::ROLL.into(), roll));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// One row per `(time, range_gate)` cell with the gate variables
    pub fn to_gate_frame(&self) -> Result<DataFrame> {
        let gates = self.range_gate_len();
        let micros: Vec<i64> = self
            .timestamp
            .iter()
            .flat_map(|timestamp| {
                std::iter::repeat_n(timestamp.and_utc().timestamp_micros(), gates)
            })
            .collect();
        let time = Series::new(dims::TIME.into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
        let range_gate: Vec<u32> = (0..self.time_len())
            .flat_map(|_| self.range_gate.iter().copied())
            .collect();

        Ok(DataFrame::new(vec![
            time.into(),
            Column::new(dims::RANGE_GATE.into(), range_gate),
            Column::new(labels::DOPPLER.into(), self.doppler.as_slice()),
            Column::new(labels::INTENSITY.into(), self.intensity.as_slice()),
            Column::new(labels::BETA.into(), self.beta.as_slice()),
        ])?)
    }

    /// File name recorded in the header, if any
    pub fn source_filename(&self) -> Option<&str> {
        self.attribute(header_keys::FILENAME)
    }
}
