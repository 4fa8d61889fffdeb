// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Routing of records into time buckets

use perfsum_aggregation::{ClosedBucket, KeyedAggregator, Observation, TimeBucket};

use crate::config::{MetricKind, SummaryConfig};
use crate::record::Record;
use crate::timestamp::parse_point_time;

/// What happened to one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// The value was folded into this bucket
    Folded(TimeBucket),
    /// The record is not a measurement point
    NotAPoint,
    /// The metric plays no part in the summary
    Ignored,
    /// A point with a relevant metric that could not be used
    Discarded(DiscardReason),
}

/// Why a point was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// No string `metric` field
    MissingMetric,
    /// No string `data.time` field
    MissingTime,
    /// `data.time` is not a usable timestamp
    InvalidTime,
    /// No numeric `data.value` field
    MissingValue,
}

/// Counters kept while folding the records of one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Points folded into a bucket
    pub folded_points: u64,
    /// Records whose `type` is not `Point`
    pub non_point_records: u64,
    /// Points whose metric is not configured
    pub ignored_records: u64,
    /// Points dropped for a missing or malformed field
    pub discarded_records: u64,
}

/// Folds [records](`Record`) into per-bucket accumulators according to a [`SummaryConfig`].
///
/// Nothing a single record contains can make folding fail; unusable records are counted
/// in [`AggregateStats`] and otherwise have no effect.
#[derive(Debug)]
pub struct BucketAggregator<'c> {
    config: &'c SummaryConfig,
    buckets: KeyedAggregator,
    stats: AggregateStats,
}

impl<'c> BucketAggregator<'c> {
    /// Create an empty aggregator.
    pub fn new(config: &'c SummaryConfig) -> Self {
        Self {
            config,
            buckets: KeyedAggregator::new(config.error_signal_mode()),
            stats: AggregateStats::default(),
        }
    }

    /// Fold one record.
    pub fn fold(&mut self, record: &Record) -> Disposition {
        let disposition = self.classify(record);
        match disposition {
            Disposition::Folded(_) => self.stats.folded_points += 1,
            Disposition::NotAPoint => self.stats.non_point_records += 1,
            Disposition::Ignored => self.stats.ignored_records += 1,
            Disposition::Discarded(_) => self.stats.discarded_records += 1,
        }
        disposition
    }

    fn classify(&mut self, record: &Record) -> Disposition {
        if !record.is_point() {
            return Disposition::NotAPoint;
        }
        let Some(metric) = record.metric() else {
            return Disposition::Discarded(DiscardReason::MissingMetric);
        };
        let Some(kind) = self.config.route(metric) else {
            return Disposition::Ignored;
        };
        let Some(time) = record.time() else {
            return Disposition::Discarded(DiscardReason::MissingTime);
        };
        let Ok(timestamp) = parse_point_time(time, self.config.time_zone()) else {
            return Disposition::Discarded(DiscardReason::InvalidTime);
        };
        let Some(value) = record.value() else {
            return Disposition::Discarded(DiscardReason::MissingValue);
        };

        let bucket = TimeBucket::containing(timestamp.as_nanosecond(), self.config.interval());
        let observation = match kind {
            MetricKind::Latency => Observation::Latency(value),
            MetricKind::Error => Observation::Error(value),
            MetricKind::Requests => Observation::Requests(value),
        };
        self.buckets.merge(bucket, observation);
        Disposition::Folded(bucket)
    }

    /// Counters so far.
    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Close every bucket, in ascending time order.
    pub fn finish(mut self) -> (Vec<(TimeBucket, ClosedBucket)>, AggregateStats) {
        (self.buckets.drain(), self.stats)
    }
}
