// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Per-bucket summary rows

use perfsum_aggregation::{ClosedBucket, TimeBucket};
use perfsum_writer::{Csv, Row, RowWriter, value::round_to};

use crate::config::SummaryConfig;
use crate::timestamp::bucket_label;

/// Columns of the summary CSV, in order.
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "time_bucket_sec",
    "avg_latency_ms",
    "p99_latency_ms",
    "rps",
    "error_rate",
];

const DECIMALS: usize = 2;
const TAIL_PERCENTILE: u32 = 99;

/// The CSV format every summary is written with.
pub fn summary_format() -> Csv {
    Csv::new(SUMMARY_COLUMNS)
}

/// One output row: the derived statistics of a bucket with latency data.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
    /// Wall-clock start of the bucket
    pub time_bucket: String,
    /// Mean latency
    pub avg_latency_ms: f64,
    /// 99th percentile latency
    pub p99_latency_ms: f64,
    /// Requests per second over the bucket width
    pub rps: f64,
    /// Error signal as a percentage of requests
    pub error_rate: f64,
}

impl SummaryRow {
    /// Derive the row of one bucket, or `None` if the bucket has no latency samples.
    ///
    /// Every number is rounded to two decimal places. The error rate is `0.0` when the
    /// bucket saw no requests and is not clamped to 100.
    pub fn from_bucket(
        bucket: TimeBucket,
        closed: &ClosedBucket,
        config: &SummaryConfig,
    ) -> Option<Self> {
        let avg = closed.latency.mean()?;
        let p99 = closed.latency.percentile(TAIL_PERCENTILE)?;
        let rps = closed.request_total / config.interval().as_secs_f64();
        let error_rate = if closed.request_total > 0.0 {
            closed.error_signal / closed.request_total * 100.0
        } else {
            0.0
        };
        Some(Self {
            time_bucket: bucket_label(bucket, config.time_zone()),
            avg_latency_ms: round_to(avg, DECIMALS),
            p99_latency_ms: round_to(p99, DECIMALS),
            rps: round_to(rps, DECIMALS),
            error_rate: round_to(error_rate, DECIMALS),
        })
    }
}

impl Row for SummaryRow {
    fn write<'a>(&'a self, writer: &mut impl RowWriter<'a>) {
        let [time_bucket, avg, p99, rps, error_rate] = SUMMARY_COLUMNS;
        writer.value(time_bucket, self.time_bucket.as_str());
        writer.value(avg, self.avg_latency_ms);
        writer.value(p99, self.p99_latency_ms);
        writer.value(rps, self.rps);
        writer.value(error_rate, self.error_rate);
    }
}

/// Rows for `buckets`, which must already be in ascending order. Buckets without latency
/// samples produce no row.
pub fn summary_rows<'a>(
    buckets: &'a [(TimeBucket, ClosedBucket)],
    config: &'a SummaryConfig,
) -> impl Iterator<Item = SummaryRow> + 'a {
    buckets
        .iter()
        .filter_map(|(bucket, closed)| SummaryRow::from_bucket(*bucket, closed, config))
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use jiff::tz::TimeZone;
    use perfsum_aggregation::{
        BucketInterval, ClosedBucket, ErrorSignalMode, KeyedAggregator, Observation, TimeBucket,
    };

    use super::{SummaryRow, summary_rows};
    use crate::config::SummaryConfig;

    fn config() -> SummaryConfig {
        SummaryConfig::builder()
            .time_zone(TimeZone::UTC)
            .build()
            .unwrap()
    }

    fn bucket(second: i64) -> TimeBucket {
        TimeBucket::containing_second(second, BucketInterval::FIVE_SECONDS)
    }

    fn closed(observations: &[(i64, Observation)]) -> Vec<(TimeBucket, ClosedBucket)> {
        let mut agg = KeyedAggregator::new(ErrorSignalMode::Sum);
        for (second, observation) in observations {
            agg.merge(bucket(*second), *observation);
        }
        agg.drain()
    }

    #[test]
    fn derives_every_column() {
        let config = config();
        let buckets = closed(&[
            (1_704_067_201, Observation::Latency(100.0)),
            (1_704_067_203, Observation::Latency(200.0)),
            (1_704_067_202, Observation::Requests(10.0)),
            (1_704_067_202, Observation::Error(2.0)),
        ]);
        let rows: Vec<_> = summary_rows(&buckets, &config).collect();
        check!(
            rows == vec![SummaryRow {
                time_bucket: "2024-01-01T00:00:00".into(),
                avg_latency_ms: 150.0,
                p99_latency_ms: 297.0,
                rps: 2.0,
                error_rate: 20.0,
            }]
        );
    }

    #[test]
    fn no_requests_means_no_rate() {
        let config = config();
        let buckets = closed(&[
            (0, Observation::Latency(1.0 / 3.0)),
            (0, Observation::Error(5.0)),
        ]);
        let row = SummaryRow::from_bucket(buckets[0].0, &buckets[0].1, &config).unwrap();
        check!(row.rps == 0.0);
        check!(row.error_rate == 0.0);
        check!(row.avg_latency_ms == 0.33);
        check!(row.p99_latency_ms == 0.33);
    }

    #[test]
    fn error_rate_is_not_clamped() {
        let config = config();
        let buckets = closed(&[
            (0, Observation::Latency(1.0)),
            (0, Observation::Requests(1.0)),
            (0, Observation::Error(3.0)),
        ]);
        let row = SummaryRow::from_bucket(buckets[0].0, &buckets[0].1, &config).unwrap();
        check!(row.error_rate == 300.0);
    }

    #[test]
    fn buckets_without_latency_are_skipped() {
        let config = config();
        let buckets = closed(&[
            (0, Observation::Requests(5.0)),
            (5, Observation::Latency(7.0)),
            (10, Observation::Error(1.0)),
        ]);
        let rows: Vec<_> = summary_rows(&buckets, &config).collect();
        check!(rows.len() == 1);
        check!(rows[0].time_bucket == "1970-01-01T00:00:05");
    }
}
