#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Time-bucketed aggregation for load-test measurements.
//!
//! Observations are classified up front ([`Observation`]) and folded into one
//! [`BucketAccumulator`] per [`TimeBucket`] by a [`KeyedAggregator`]. Draining the
//! aggregator closes every bucket, in ascending time order, into a [`ClosedBucket`]
//! carrying the latency [`Distribution`](histogram::Distribution), the error signal and
//! the request total.

pub mod aggregator;
pub mod histogram;
pub mod key;
pub mod value;

pub use aggregator::{BucketAccumulator, ClosedBucket, KeyedAggregator, Observation};
pub use key::{BucketInterval, TimeBucket};
pub use value::{ErrorSignal, ErrorSignalMode};
