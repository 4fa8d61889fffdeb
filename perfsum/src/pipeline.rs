// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Reading, folding and emitting one source
//!
//! A source is read to the end before anything is written, so a read failure never
//! leaves a truncated summary behind.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;

use perfsum_aggregation::{ClosedBucket, TimeBucket};
use perfsum_writer::{FormatExt, IoStreamError, RowIoStream};
use tracing::{debug, info, warn};

use crate::aggregate::{AggregateStats, BucketAggregator};
use crate::config::SummaryConfig;
use crate::error::PipelineError;
use crate::record::{ReadStats, RecordReader};
use crate::summary::{summary_format, summary_rows};

/// The closed buckets of one source, with the counters gathered while reading it.
#[derive(Debug)]
pub struct Aggregated {
    /// Closed buckets, ascending
    pub buckets: Vec<(TimeBucket, ClosedBucket)>,
    /// Line counters
    pub read: ReadStats,
    /// Record counters
    pub aggregate: AggregateStats,
}

/// Read every record of `input` and fold it into buckets.
///
/// Only IO errors fail; malformed lines and unusable records are counted.
pub fn aggregate<R: BufRead>(input: R, config: &SummaryConfig) -> io::Result<Aggregated> {
    let mut reader = RecordReader::new(input);
    let mut aggregator = BucketAggregator::new(config);
    for record in &mut reader {
        aggregator.fold(&record?);
    }
    let (buckets, aggregate) = aggregator.finish();
    Ok(Aggregated {
        buckets,
        read: reader.stats(),
        aggregate,
    })
}

/// What converting one source produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileReport {
    /// Line counters
    pub read: ReadStats,
    /// Record counters
    pub aggregate: AggregateStats,
    /// Buckets that received any data
    pub buckets: usize,
    /// Summary rows written, excluding the header
    pub rows_written: usize,
}

impl FileReport {
    /// Whether the summary has a header and no rows.
    pub fn is_empty(&self) -> bool {
        self.rows_written == 0
    }
}

/// Write the summary rows of `aggregated` to `stream` and flush it.
pub fn emit(
    aggregated: &Aggregated,
    stream: &mut impl RowIoStream,
    config: &SummaryConfig,
) -> Result<FileReport, IoStreamError> {
    let mut rows_written = 0;
    for row in summary_rows(&aggregated.buckets, config) {
        stream.next(&row)?;
        rows_written += 1;
    }
    stream.flush()?;
    Ok(FileReport {
        read: aggregated.read,
        aggregate: aggregated.aggregate,
        buckets: aggregated.buckets.len(),
        rows_written,
    })
}

/// Summarize `input` as CSV into `output`.
///
/// ```
/// use jiff::tz::TimeZone;
/// use perfsum::{SummaryConfig, pipeline::summarize};
///
/// let input = r#"{"type":"Point","metric":"http_req_duration","data":{"time":"2024-01-01T00:00:01","value":100}}"#;
/// let config = SummaryConfig::builder().time_zone(TimeZone::UTC).build().unwrap();
/// let mut out = Vec::new();
/// let report = summarize(input.as_bytes(), &mut out, &config).unwrap();
/// assert_eq!(report.rows_written, 1);
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "time_bucket_sec,avg_latency_ms,p99_latency_ms,rps,error_rate\n\
///      2024-01-01T00:00:00,100.0,100.0,0.0,0.0\n",
/// );
/// ```
pub fn summarize<R: BufRead, W: io::Write>(
    input: R,
    output: W,
    config: &SummaryConfig,
) -> Result<FileReport, PipelineError> {
    let aggregated = aggregate(input, config).map_err(PipelineError::Read)?;
    let mut stream = summary_format().output_to(output);
    Ok(emit(&aggregated, &mut stream, config)?)
}

/// Convert the file at `input` into a CSV summary at `output`, replacing it.
///
/// The output file is only created once the input has been read in full. An `output`
/// that resolves to `input` itself is rejected before anything is read.
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &SummaryConfig,
) -> Result<FileReport, PipelineError> {
    if is_same_file(input, output) {
        return Err(PipelineError::SameFile {
            path: input.to_owned(),
        });
    }
    let file = File::open(input).map_err(|source| PipelineError::Open {
        path: input.to_owned(),
        source,
    })?;
    let aggregated =
        aggregate(BufReader::new(file), config).map_err(PipelineError::Read)?;

    let file = File::create(output).map_err(|source| PipelineError::Create {
        path: output.to_owned(),
        source,
    })?;
    let mut stream = summary_format().output_to(BufWriter::new(file));
    let report = emit(&aggregated, &mut stream, config)?;
    log_report(input, output, &report);
    Ok(report)
}

// A path that can't be resolved doesn't exist yet, so it can't be the input.
fn is_same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

fn log_report(input: &Path, output: &Path, report: &FileReport) {
    let input = input.display();
    let output = output.display();
    if report.read.malformed_lines > 0 {
        warn!(
            %input,
            malformed_lines = report.read.malformed_lines,
            "skipped malformed lines"
        );
    }
    if report.aggregate.discarded_records > 0 {
        debug!(
            %input,
            discarded_records = report.aggregate.discarded_records,
            "discarded unusable points"
        );
    }
    if report.is_empty() {
        warn!(%input, %output, "no latency data, wrote header only");
    } else {
        info!(
            %input,
            %output,
            rows = report.rows_written,
            lines = report.read.lines_processed,
            points = report.aggregate.folded_points,
            ignored = report.aggregate.ignored_records,
            discarded = report.aggregate.discarded_records,
            "converted"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Read};

    use assert2::{check, let_assert};
    use jiff::tz::TimeZone;
    use perfsum_writer::NullRowIoStream;

    use super::{aggregate, convert_file, emit, summarize};
    use crate::config::SummaryConfig;
    use crate::error::PipelineError;

    fn config() -> SummaryConfig {
        SummaryConfig::builder()
            .time_zone(TimeZone::UTC)
            .build()
            .unwrap()
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    impl BufRead for FailingReader {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            Err(io::Error::other("disk on fire"))
        }

        fn consume(&mut self, _amt: usize) {}
    }

    #[test]
    fn read_errors_write_nothing() {
        let mut out = Vec::new();
        let result = summarize(FailingReader, &mut out, &config());
        let_assert!(Err(PipelineError::Read(err)) = result);
        check!(err.to_string() == "disk on fire");
        check!(out.is_empty());
    }

    #[test]
    fn report_counts_rows_and_buckets() {
        let config = config();
        let input = concat!(
            r#"{"type":"Point","metric":"http_reqs","data":{"time":"2024-01-01T00:00:01","value":1}}"#,
            "\n",
            r#"{"type":"Point","metric":"http_req_duration","data":{"time":"2024-01-01T00:00:06","value":1}}"#,
            "\n",
        );
        let aggregated = aggregate(input.as_bytes(), &config).unwrap();
        let report = emit(&aggregated, &mut NullRowIoStream::default(), &config).unwrap();
        check!(report.buckets == 2);
        check!(report.rows_written == 1);
        check!(!report.is_empty());
        check!(report.read.lines_processed == 2);
        check!(report.aggregate.folded_points == 2);
    }

    #[test]
    fn refuses_to_overwrite_its_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.csv");
        let line = r#"{"type":"Point","metric":"http_req_duration","data":{"time":"2024-01-01T00:00:01","value":1}}"#;
        std::fs::write(&input, line).unwrap();

        let same = dir.path().join(".").join("run.csv");
        let result = convert_file(&input, &same, &config());
        let_assert!(Err(PipelineError::SameFile { path }) = result);
        check!(path == input);
        check!(std::fs::read_to_string(&input).unwrap() == line);
    }
}
