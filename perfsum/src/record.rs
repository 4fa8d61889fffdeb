// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Line-delimited JSON record reading
//!
//! Every non-blank line of the input is parsed on its own as a JSON object. Lines that
//! are not a JSON object (or not UTF-8) are counted and skipped; only IO errors end the
//! pass.

use std::io::{self, BufRead};

use serde_json::{Map, Value};
use tracing::debug;

/// Tag of the records that carry a measurement.
pub const POINT_TYPE: &str = "Point";

/// One parsed input line.
///
/// Accessors return `None` when a field is missing or has the wrong JSON type; the record
/// itself stays valid.
#[derive(Clone, Debug, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Parse one line. Anything but a JSON object is an error.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line).map(Self)
    }

    /// The `type` tag.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type")?.as_str()
    }

    /// Whether this record is a measurement point.
    pub fn is_point(&self) -> bool {
        self.kind() == Some(POINT_TYPE)
    }

    /// The `metric` name.
    pub fn metric(&self) -> Option<&str> {
        self.0.get("metric")?.as_str()
    }

    /// The raw `data.time` string.
    pub fn time(&self) -> Option<&str> {
        self.data()?.get("time")?.as_str()
    }

    /// The numeric `data.value`.
    pub fn value(&self) -> Option<f64> {
        self.data()?.get("value")?.as_f64()
    }

    fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("data")?.as_object()
    }
}

/// Counters kept while reading one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Lines parsed into a [`Record`], relevant or not
    pub lines_processed: u64,
    /// Lines that were not a JSON object
    pub malformed_lines: u64,
    /// Empty or whitespace-only lines
    pub blank_lines: u64,
}

/// Lazy, single-pass iterator of the [records](`Record`) of a line-oriented source.
///
/// ```
/// use perfsum::record::RecordReader;
///
/// let input = "{\"type\":\"Point\"}\n\nnot json\n";
/// let mut reader = RecordReader::new(input.as_bytes());
/// let records: Vec<_> = (&mut reader).collect::<Result<_, _>>().unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(reader.stats().malformed_lines, 1);
/// assert_eq!(reader.stats().blank_lines, 1);
/// ```
#[derive(Debug)]
pub struct RecordReader<R> {
    input: R,
    buf: Vec<u8>,
    line_number: u64,
    stats: ReadStats,
}

impl<R: BufRead> RecordReader<R> {
    /// Read records from `input`.
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
            line_number: 0,
            stats: ReadStats::default(),
        }
    }

    /// Counters for the lines consumed so far.
    pub fn stats(&self) -> ReadStats {
        self.stats
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.input.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Some(Err(err)),
            }
            self.line_number += 1;

            let Ok(line) = std::str::from_utf8(&self.buf) else {
                self.stats.malformed_lines += 1;
                debug!(line = self.line_number, "skipping line that is not UTF-8");
                continue;
            };
            if line.trim().is_empty() {
                self.stats.blank_lines += 1;
                continue;
            }
            match Record::from_line(line) {
                Ok(record) => {
                    self.stats.lines_processed += 1;
                    return Some(Ok(record));
                }
                Err(error) => {
                    self.stats.malformed_lines += 1;
                    debug!(line = self.line_number, %error, "skipping malformed line");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use rstest::rstest;

    use super::{Record, RecordReader};

    #[test]
    fn point_accessors() {
        let record = Record::from_line(
            r#"{"type":"Point","metric":"http_reqs","data":{"time":"2024-01-01T00:00:01Z","value":1}}"#,
        )
        .unwrap();
        check!(record.is_point());
        check!(record.metric() == Some("http_reqs"));
        check!(record.time() == Some("2024-01-01T00:00:01Z"));
        check!(record.value() == Some(1.0));
    }

    #[test]
    fn wrong_field_types_read_as_missing() {
        let record =
            Record::from_line(r#"{"type":"Point","metric":7,"data":{"time":1,"value":"x"}}"#)
                .unwrap();
        check!(record.is_point());
        check!(record.metric().is_none());
        check!(record.time().is_none());
        check!(record.value().is_none());

        let record = Record::from_line(r#"{"type":"Point","data":[1,2]}"#).unwrap();
        check!(record.value().is_none());
    }

    #[rstest]
    #[case("[1,2,3]")]
    #[case("42")]
    #[case("\"Point\"")]
    #[case("{\"type\":")]
    #[case("{} {}")]
    fn non_objects_are_errors(#[case] line: &str) {
        check!(Record::from_line(line).is_err());
    }

    #[test]
    fn counts_lines_by_outcome() {
        let input = b"{\"a\":1}\r\n   \n{oops\n\xff\xfe\n{\"b\":2}";
        let mut reader = RecordReader::new(&input[..]);
        let records: Vec<_> = (&mut reader).map(Result::unwrap).collect();
        check!(records.len() == 2);

        let stats = reader.stats();
        check!(stats.lines_processed == 2);
        check!(stats.malformed_lines == 2);
        check!(stats.blank_lines == 1);
    }
}
