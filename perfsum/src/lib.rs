// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! Summarize line-delimited JSON load-test output into fixed-interval CSV reports.
//!
//! Each `Point` record of a source is routed by metric name into a five-second
//! [bucket](perfsum_aggregation::TimeBucket). Every bucket that received latency data
//! becomes one CSV row with the mean and 99th percentile latency, requests per second
//! and error rate.
//!
//! [`pipeline::convert_file`] converts one file; [`batch::run_target`] converts every
//! file of a [`batch::Target`] under a results directory.

pub mod aggregate;
pub mod batch;
pub mod config;
mod error;
pub mod pipeline;
pub mod record;
pub mod summary;
pub mod timestamp;

pub use batch::{
    BatchError, FileOutcome, FileResult, InvalidTarget, ResultsLayout, Target, TargetReport,
    run_target,
};
pub use config::{ConfigError, MetricKind, SummaryConfig, SummaryConfigBuilder};
pub use error::PipelineError;
pub use pipeline::{FileReport, convert_file, summarize};
pub use summary::{SUMMARY_COLUMNS, SummaryRow};

pub use perfsum_aggregation::{BucketInterval, ErrorSignalMode};
