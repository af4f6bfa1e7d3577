//! HPL header parsing and metadata extraction.
//!
//! Reads the fixed block of `Key: Value` lines at the top of a file, then the
//! label lines that describe the record columns. Required fields are checked
//! against a small schema before any record is decoded.

use crate::constants::{HEADER_LINE_COUNT, LABEL_LINE_COUNT, MAX_GATES, header_keys};
use crate::error::{HplError, Result};
use crate::lines::LineReader;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::debug;

/// A header value with the line it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub value: String,
    pub line: usize,
}

/// Raw header fields and label lines, as found in the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHeader {
    fields: BTreeMap<String, HeaderField>,
    labels: Vec<String>,
    last_line: usize,
}

/// Header fields the decoder depends on, parsed and validated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderInfo {
    pub num_gates: usize,
    pub range_gate_length_m: f64,
    pub start_date: NaiveDate,
}

/// `Key: Value` header line. The key runs to the first colon; the value keeps
/// any later colons.
static FIELD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:]+?)\s*:\s*(.*?)\s*$").expect("header field pattern is valid")
});

/// Consume the header and label lines from the start of a stream
pub fn parse_header<R: BufRead>(lines: &mut LineReader<R>) -> Result<RawHeader> {
    let mut header = RawHeader::default();

    for _ in 0..HEADER_LINE_COUNT {
        let expected = lines.lines_read() + 1;
        let (line_num, text) = lines.next_line()?.ok_or_else(|| {
            HplError::malformed_header(expected, "unexpected end of input in header fields")
        })?;

        let (key, value) = match FIELD_PATTERN.captures(text) {
            Some(captures) => (
                captures[1].to_string(),
                captures
                    .get(2)
                    .map_or_else(String::new, |m| m.as_str().to_string()),
            ),
            None if text.trim().is_empty() => {
                debug!("Blank header line {}", line_num);
                continue;
            }
            None => {
                debug!("Header line {} has no key separator", line_num);
                (text.trim().to_string(), String::new())
            }
        };

        if header.fields.contains_key(&key) {
            debug!("Header key '{}' repeated at line {}", key, line_num);
        }
        header.fields.insert(
            key,
            HeaderField {
                value,
                line: line_num,
            },
        );
    }

    for _ in 0..LABEL_LINE_COUNT {
        let expected = lines.lines_read() + 1;
        let (_, text) = lines.next_line()?.ok_or_else(|| {
            HplError::malformed_header(expected, "unexpected end of input in label lines")
        })?;
        header.labels.push(text.to_string());
    }

    header.last_line = lines.lines_read();
    debug!(
        "Parsed header: {} fields, {} label lines",
        header.fields.len(),
        header.labels.len()
    );

    Ok(header)
}

impl RawHeader {
    /// Value for a header key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|field| field.value.as_str())
    }

    /// All header fields in key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, field)| (key.as_str(), field.value.as_str()))
    }

    /// Label lines following the header fields
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Colon-separated pieces of the start time value
    pub fn start_time_tokens(&self) -> Option<Vec<&str>> {
        self.get(header_keys::START_TIME)
            .map(|value| value.split(':').collect())
    }

    /// Check required fields and parse them
    pub fn validate(&self) -> Result<HeaderInfo> {
        for key in header_keys::REQUIRED {
            if !self.fields.contains_key(*key) {
                return Err(HplError::malformed_header(
                    self.last_line.min(HEADER_LINE_COUNT),
                    format!("missing required field '{}'", key),
                ));
            }
        }

        let gates_field = &self.fields[header_keys::NUMBER_OF_GATES];
        let num_gates = gates_field.value.parse::<usize>().map_err(|e| {
            HplError::malformed_header(
                gates_field.line,
                format!("invalid number of gates '{}': {}", gates_field.value, e),
            )
        })?;
        if num_gates == 0 || num_gates > MAX_GATES {
            return Err(HplError::malformed_header(
                gates_field.line,
                format!(
                    "number of gates must be between 1 and {}, found {}",
                    MAX_GATES, num_gates
                ),
            ));
        }

        let length_field = &self.fields[header_keys::RANGE_GATE_LENGTH];
        let range_gate_length_m = length_field
            .value
            .parse::<f64>()
            .ok()
            .filter(|length| length.is_finite())
            .ok_or_else(|| {
                HplError::malformed_header(
                    length_field.line,
                    format!("invalid range gate length '{}'", length_field.value),
                )
            })?;

        // The date sits before the first colon of the start time
        let start_field = &self.fields[header_keys::START_TIME];
        let start_date = self
            .start_time_tokens()
            .and_then(|tokens| tokens.first().copied())
            .and_then(parse_start_date)
            .ok_or_else(|| {
                HplError::malformed_header(
                    start_field.line,
                    format!(
                        "start time '{}' does not begin with a YYYYMMDD date",
                        start_field.value
                    ),
                )
            })?;

        Ok(HeaderInfo {
            num_gates,
            range_gate_length_m,
            start_date,
        })
    }
}

/// Parse the `YYYYMMDD` date at the start of a start time value.
///
/// Only the calendar date is used; the clock time that follows it is
/// ignored because each record carries its own time of day.
pub fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let digits = value.trim().get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year = digits[..4].parse::<i32>().ok()?;
    let month = digits[4..6].parse::<u32>().ok()?;
    let day = digits[6..].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE_HEADER: &str = "Filename:\tStare_116_20210315_13.hpl
System ID:\t116
Number of gates:\t200
Range gate length (m):\t30.0
Gate length (pts):\t10
Pulses/ray:\t20000
No. of rays in file:\t1
Scan type:\tStare
Focus range:\t65535
Start time:\t20210315 13:00:04.83
Resolution (m/s):\t0.0382
Altitude of measurement (center of gate) = (range gate + 0.5) * Gate length
Data line 1: Decimal time (hours)  Azimuth (degrees)  Elevation (degrees) Pitch (degrees) Roll (degrees)
f9.6,1x,f6.2,1x,f6.2,1x,f6.2,1x,f6.2
Data line 2: Range Gate  Doppler (m/s)  Intensity (SNR + 1)  Beta (m-1 sr-1)
i3,1x,f6.4,1x,f8.6,1x,e12.6 - repeat for no. gates
****
13.000000 0.00 90.00 0.10 -0.20
";

    fn parse(content: &str) -> Result<RawHeader> {
        let mut lines = LineReader::new(Cursor::new(content.to_string()));
        parse_header(&mut lines)
    }

    #[test]
    fn test_parse_sample_header() {
        let header = parse(SAMPLE_HEADER).unwrap();

        assert_eq!(header.get("Filename"), Some("Stare_116_20210315_13.hpl"));
        assert_eq!(header.get(header_keys::NUMBER_OF_GATES), Some("200"));
        assert_eq!(header.get(header_keys::SCAN_TYPE), Some("Stare"));
        assert_eq!(header.fields[header_keys::START_TIME].line, 10);
        assert_eq!(header.labels().len(), LABEL_LINE_COUNT);
        assert_eq!(header.labels()[5], "****");
    }

    #[test]
    fn test_header_stops_before_records() {
        let mut lines = LineReader::new(Cursor::new(SAMPLE_HEADER.to_string()));
        parse_header(&mut lines).unwrap();

        assert_eq!(lines.lines_read(), HEADER_LINE_COUNT + LABEL_LINE_COUNT);
        let (line, text) = lines.next_line().unwrap().unwrap();
        assert_eq!(line, 18);
        assert!(text.starts_with("13.000000"));
    }

    #[test]
    fn test_start_time_keeps_colons() {
        let header = parse(SAMPLE_HEADER).unwrap();

        assert_eq!(
            header.get(header_keys::START_TIME),
            Some("20210315 13:00:04.83")
        );
        assert_eq!(
            header.start_time_tokens().unwrap(),
            vec!["20210315 13", "00", "04.83"]
        );
    }

    #[test]
    fn test_values_keep_later_colons() {
        let content = SAMPLE_HEADER.replace("Scan type:\tStare", "Scan type:\tUser: VAD 1");
        let header = parse(&content).unwrap();
        assert_eq!(header.get(header_keys::SCAN_TYPE), Some("User: VAD 1"));
    }

    #[test]
    fn test_blank_header_line_takes_a_slot() {
        let content = SAMPLE_HEADER.replace("System ID:\t116\n", "\n");
        let mut lines = LineReader::new(Cursor::new(content));
        let header = parse_header(&mut lines).unwrap();

        assert_eq!(header.fields().count(), HEADER_LINE_COUNT - 1);
        assert_eq!(header.get(header_keys::SYSTEM_ID), None);
        assert_eq!(header.get(""), None);
        assert_eq!(header.labels()[5], "****");
        assert_eq!(lines.lines_read(), HEADER_LINE_COUNT + LABEL_LINE_COUNT);
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_line_without_colon_kept_as_key() {
        let content = SAMPLE_HEADER.replace("Focus range:\t65535", "  Focus range 65535 ");
        let header = parse(&content).unwrap();

        assert_eq!(header.get("Focus range 65535"), Some(""));
        assert_eq!(header.get("Focus range"), None);
        assert_eq!(header.fields["Focus range 65535"].line, 9);
        assert_eq!(header.fields().count(), HEADER_LINE_COUNT);
    }

    #[test]
    fn test_validate_sample_header() {
        let info = parse(SAMPLE_HEADER).unwrap().validate().unwrap();

        assert_eq!(info.num_gates, 200);
        assert_eq!(info.range_gate_length_m, 30.0);
        assert_eq!(
            info.start_date,
            NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_missing_number_of_gates() {
        let content = SAMPLE_HEADER.replace("Number of gates:\t200", "Gate count:\t200");
        let err = parse(&content).unwrap().validate().unwrap_err();

        match err {
            HplError::MalformedHeader { reason, .. } => {
                assert!(reason.contains("Number of gates"));
            }
            other => panic!("Expected MalformedHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_fields() {
        let content = SAMPLE_HEADER.replace("Number of gates:\t200", "Number of gates:\tmany");
        let err = parse(&content).unwrap().validate().unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 3, .. }));

        let content = SAMPLE_HEADER.replace("(m):\t30.0", "(m):\tthirty");
        let err = parse(&content).unwrap().validate().unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 4, .. }));
    }

    #[test]
    fn test_zero_gates_rejected() {
        let content = SAMPLE_HEADER.replace("Number of gates:\t200", "Number of gates:\t0");
        let err = parse(&content).unwrap().validate().unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 3, .. }));
    }

    #[test]
    fn test_undatable_start_time() {
        let content = SAMPLE_HEADER.replace("20210315 13:00:04.83", "yesterday");
        let err = parse(&content).unwrap().validate().unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 10, .. }));
    }

    #[test]
    fn test_truncated_header() {
        let truncated: String = SAMPLE_HEADER.lines().take(5).collect::<Vec<_>>().join("\n");
        let err = parse(&truncated).unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 6, .. }));

        let no_labels: String = SAMPLE_HEADER.lines().take(13).collect::<Vec<_>>().join("\n");
        let err = parse(&no_labels).unwrap_err();
        assert!(matches!(err, HplError::MalformedHeader { line: 14, .. }));
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(
            parse_start_date("20210315 13:00:04.83"),
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );
        assert_eq!(parse_start_date("\t19991231"), NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(parse_start_date("20211345"), None);
        assert_eq!(parse_start_date("2021"), None);
    }
}
