//! Aggregation structures for collecting observations by time bucket

use crate::histogram::{Distribution, Histogram};
use crate::key::TimeBucket;
use crate::value::{AggregateValue, ErrorSignal, ErrorSignalMode, Sum};

/// One measurement, already classified by what it represents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Observation {
    /// A response time, in milliseconds
    Latency(f64),
    /// An error indicator or error amount
    Error(f64),
    /// A number of requests
    Requests(f64),
}

/// The three independent accumulators kept for each bucket.
#[derive(Clone, Debug)]
pub struct BucketAccumulator {
    latency: Histogram,
    errors: ErrorSignal,
    requests: <Sum as AggregateValue>::Aggregated,
}

impl BucketAccumulator {
    /// An empty accumulator whose error signal follows `mode`.
    pub fn new(mode: ErrorSignalMode) -> Self {
        Self {
            latency: Histogram::default(),
            errors: ErrorSignal::new(mode),
            requests: Default::default(),
        }
    }

    /// Fold one observation into the matching accumulator.
    pub fn merge(&mut self, observation: Observation) {
        match observation {
            Observation::Latency(v) => self.latency.add_value(v),
            Observation::Error(v) => self.errors.add_value(v),
            Observation::Requests(v) => Sum::add_value(&mut self.requests, v),
        }
    }

    /// Close the accumulator into its final per-bucket values.
    pub fn close(self) -> ClosedBucket {
        ClosedBucket {
            latency: self.latency.close(),
            error_signal: self.errors.value(),
            request_total: self.requests,
        }
    }
}

/// Final aggregates of one bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct ClosedBucket {
    /// Sorted latency samples
    pub latency: Distribution,
    /// Error count or error sum, depending on the [`ErrorSignalMode`]
    pub error_signal: f64,
    /// Sum of request-count observations
    pub request_total: f64,
}

/// Keyed aggregator that uses a HashMap to aggregate observations by time bucket
///
/// Buckets are created on first observation and never removed before [`drain`]. Arrival
/// order does not matter: [`drain`] always yields buckets in ascending key order.
///
/// [`drain`]: KeyedAggregator::drain
#[derive(Debug)]
pub struct KeyedAggregator {
    storage: hashbrown::HashMap<TimeBucket, BucketAccumulator>,
    mode: ErrorSignalMode,
}

impl KeyedAggregator {
    /// Create a new keyed aggregator
    pub fn new(mode: ErrorSignalMode) -> Self {
        Self {
            storage: Default::default(),
            mode,
        }
    }

    /// Fold `observation` into the accumulator of `bucket`, creating it if needed.
    pub fn merge(&mut self, bucket: TimeBucket, observation: Observation) {
        let mode = self.mode;
        self.storage
            .entry(bucket)
            .or_insert_with(|| BucketAccumulator::new(mode))
            .merge(observation);
    }

    /// Number of buckets seen so far.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether no observation was merged yet.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Close every bucket, in ascending key order, leaving the aggregator empty.
    pub fn drain(&mut self) -> Vec<(TimeBucket, ClosedBucket)> {
        let mut buckets: Vec<_> = self
            .storage
            .drain()
            .map(|(key, accum)| (key, accum.close()))
            .collect();
        buckets.sort_unstable_by_key(|(key, _)| *key);
        buckets
    }
}
