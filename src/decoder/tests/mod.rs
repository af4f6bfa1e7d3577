//! Tests for the decoder pipeline
//!
//! Builds HPL file contents in memory and runs them through [`HplDecoder`].

use crate::config::DecodeConfig;
use crate::dataset::LidarDataset;
use crate::decoder::HplDecoder;
use crate::error::Result;
use crate::models::FormatVariant;
use std::fmt::Write as _;
use std::io::Cursor;


/// One record group: scalar values and gate lines
#[derive(Debug, Clone)]
pub struct FixtureRecord {
    pub scalars: Vec<f64>,
    pub gates: Vec<(i64, f64, f64, f64)>,
}

/// In-memory HPL file builder
#[derive(Debug, Clone)]
pub struct HplFixture {
    pub variant: FormatVariant,
    pub num_gates: usize,
    pub range_gate_length: String,
    pub start_time: String,
    pub records: Vec<FixtureRecord>,
    pub trailer: String,
}

impl HplFixture {
    pub fn new(variant: FormatVariant, num_gates: usize) -> Self {
        Self {
            variant,
            num_gates,
            range_gate_length: "30.0".to_string(),
            start_time: "20210315 13:00:04.83".to_string(),
            records: Vec::new(),
            trailer: String::new(),
        }
    }

    pub fn profile(num_gates: usize) -> Self {
        Self::new(FormatVariant::Profile, num_gates)
    }

    pub fn summary(num_gates: usize) -> Self {
        Self::new(FormatVariant::Summary, num_gates)
    }

    /// Add a record whose gate lines run in index order
    pub fn with_record(mut self, scalars: &[f64], gates: &[(f64, f64, f64)]) -> Self {
        let gates = gates
            .iter()
            .enumerate()
            .map(|(index, (doppler, intensity, beta))| {
                (index as i64, *doppler, *intensity, *beta)
            })
            .collect();
        self.records.push(FixtureRecord {
            scalars: scalars.to_vec(),
            gates,
        });
        self
    }

    /// Add a record with explicit gate indices
    pub fn with_indexed_record(mut self, scalars: &[f64], gates: &[(i64, f64, f64, f64)]) -> Self {
        self.records.push(FixtureRecord {
            scalars: scalars.to_vec(),
            gates: gates.to_vec(),
        });
        self
    }

    /// Add `count` regular records, one every 10 seconds from 13:00
    pub fn with_regular_records(mut self, count: usize) -> Self {
        for record in 0..count {
            let hours = 13.0 + record as f64 * 10.0 / 3600.0;
            let mut scalars = vec![hours, 180.0, 90.0];
            if self.variant == FormatVariant::Profile {
                scalars.extend([0.1, -0.1]);
            }
            let gates: Vec<(f64, f64, f64)> = (0..self.num_gates)
                .map(|gate| {
                    let offset = (record * self.num_gates + gate) as f64;
                    (offset * 0.01 - 1.0, 1.0 + offset * 0.001, 1.0e-6 * (offset + 1.0))
                })
                .collect();
            self = self.with_record(&scalars, &gates);
        }
        self
    }

    /// Text appended after the last record
    pub fn with_trailer(mut self, trailer: &str) -> Self {
        self.trailer = trailer.to_string();
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Filename:\tStare_116_20210315_13.hpl");
        let _ = writeln!(out, "System ID:\t116");
        let _ = writeln!(out, "Number of gates:\t{}", self.num_gates);
        let _ = writeln!(out, "Range gate length (m):\t{}", self.range_gate_length);
        let _ = writeln!(out, "Gate length (pts):\t10");
        let _ = writeln!(out, "Pulses/ray:\t20000");
        let _ = writeln!(out, "No. of rays in file:\t{}", self.records.len());
        let _ = writeln!(out, "Scan type:\tStare");
        let _ = writeln!(out, "Focus range:\t65535");
        let _ = writeln!(out, "Start time:\t{}", self.start_time);
        let _ = writeln!(out, "Resolution (m/s):\t0.0382");
        let _ = writeln!(
            out,
            "Altitude of measurement (center of gate) = (range gate + 0.5) * Gate length"
        );
        match self.variant {
            FormatVariant::Profile => {
                let _ = writeln!(
                    out,
                    "Data line 1: Decimal time (hours)  Azimuth (degrees)  Elevation (degrees) Pitch (degrees) Roll (degrees)"
                );
                let _ = writeln!(out, "f9.6,1x,f6.2,1x,f6.2,1x,f6.2,1x,f6.2");
            }
            FormatVariant::Summary => {
                let _ = writeln!(
                    out,
                    "Data line 1: Decimal time (hours)  Azimuth (degrees)  Elevation (degrees)"
                );
                let _ = writeln!(out, "f9.6,1x,f6.2,1x,f6.2");
            }
        }
        let _ = writeln!(
            out,
            "Data line 2: Range Gate  Doppler (m/s)  Intensity (SNR + 1)  Beta (m-1 sr-1)"
        );
        let _ = writeln!(out, "i3,1x,f6.4,1x,f8.6,1x,e12.6 - repeat for no. gates");
        let _ = writeln!(out, "****");

        for record in &self.records {
            let scalars: Vec<String> = record.scalars.iter().map(f64::to_string).collect();
            let _ = writeln!(out, "{}", scalars.join(" "));
            for (index, doppler, intensity, beta) in &record.gates {
                let _ = writeln!(out, "{:>3} {} {} {:e}", index, doppler, intensity, beta);
            }
        }
        out.push_str(&self.trailer);
        out
    }

    pub fn decode(&self) -> Result<LidarDataset> {
        self.decode_with(DecodeConfig::default())
    }

    pub fn decode_with(&self, config: DecodeConfig) -> Result<LidarDataset> {
        HplDecoder::new(config).decode(Cursor::new(self.render()))
    }
}

/// Line number of the first record's scalar line in a rendered fixture
pub const FIRST_RECORD_LINE: usize = 18;
