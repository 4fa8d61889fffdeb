// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Configuration of a summary run

use std::collections::BTreeSet;
use std::fmt;

use jiff::tz::TimeZone;
use perfsum_aggregation::{BucketInterval, ErrorSignalMode};

/// Metric carrying per-request latency in k6 output.
pub const DEFAULT_LATENCY_METRIC: &str = "http_req_duration";
/// Metric carrying the error indicator in the load-test scripts.
pub const DEFAULT_ERROR_METRIC: &str = "errors";
/// Metric counting requests in k6 output.
pub const DEFAULT_REQUEST_METRIC: &str = "http_reqs";

/// What a metric name stands for, once matched against a [`SummaryConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    /// One of the latency metrics
    Latency,
    /// The error metric
    Error,
    /// The request-count metric
    Requests,
}

/// Immutable settings for turning records into summary rows.
///
/// Every metric name maps to at most one [`MetricKind`]; [`SummaryConfigBuilder::build`]
/// rejects overlapping names.
///
/// ```
/// use jiff::tz::TimeZone;
/// use perfsum::config::{MetricKind, SummaryConfig};
///
/// let config = SummaryConfig::builder()
///     .add_latency_metric("login_latency")
///     .time_zone(TimeZone::UTC)
///     .build()
///     .unwrap();
/// assert_eq!(config.route("login_latency"), Some(MetricKind::Latency));
/// assert_eq!(config.route("http_reqs"), Some(MetricKind::Requests));
/// assert_eq!(config.route("vus"), None);
/// ```
#[derive(Clone, Debug)]
pub struct SummaryConfig {
    interval: BucketInterval,
    latency_metrics: BTreeSet<String>,
    error_metric: String,
    request_metric: String,
    error_signal_mode: ErrorSignalMode,
    time_zone: TimeZone,
}

impl SummaryConfig {
    /// Start from the defaults: k6 metric names, error counting, the system time zone.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder::default()
    }

    /// Width of every time bucket.
    pub fn interval(&self) -> BucketInterval {
        self.interval
    }

    /// Metric names whose values are latencies.
    pub fn latency_metrics(&self) -> impl Iterator<Item = &str> {
        self.latency_metrics.iter().map(String::as_str)
    }

    /// Metric name whose values are error indicators.
    pub fn error_metric(&self) -> &str {
        &self.error_metric
    }

    /// Metric name whose values are request counts.
    pub fn request_metric(&self) -> &str {
        &self.request_metric
    }

    /// How error values accumulate.
    pub fn error_signal_mode(&self) -> ErrorSignalMode {
        self.error_signal_mode
    }

    /// Zone used to read naive record timestamps and to label buckets.
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Classify `metric`, or `None` if it plays no part in the summary.
    pub fn route(&self, metric: &str) -> Option<MetricKind> {
        if self.latency_metrics.contains(metric) {
            Some(MetricKind::Latency)
        } else if metric == self.error_metric {
            Some(MetricKind::Error)
        } else if metric == self.request_metric {
            Some(MetricKind::Requests)
        } else {
            None
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            interval: BucketInterval::FIVE_SECONDS,
            latency_metrics: BTreeSet::from([DEFAULT_LATENCY_METRIC.to_owned()]),
            error_metric: DEFAULT_ERROR_METRIC.to_owned(),
            request_metric: DEFAULT_REQUEST_METRIC.to_owned(),
            error_signal_mode: ErrorSignalMode::default(),
            time_zone: TimeZone::system(),
        }
    }
}

/// Builder for [`SummaryConfig`]. See [`SummaryConfig::builder`].
#[derive(Clone, Debug, Default)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    /// Replace the latency metric set.
    pub fn latency_metrics<I>(mut self, metrics: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.config.latency_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Add one name to the latency metric set.
    pub fn add_latency_metric(mut self, metric: impl Into<String>) -> Self {
        self.config.latency_metrics.insert(metric.into());
        self
    }

    /// Set the error metric name.
    pub fn error_metric(mut self, metric: impl Into<String>) -> Self {
        self.config.error_metric = metric.into();
        self
    }

    /// Set the request-count metric name.
    pub fn request_metric(mut self, metric: impl Into<String>) -> Self {
        self.config.request_metric = metric.into();
        self
    }

    /// Set how error values accumulate.
    pub fn error_signal_mode(mut self, mode: ErrorSignalMode) -> Self {
        self.config.error_signal_mode = mode;
        self
    }

    /// Set the time zone for naive timestamps and bucket labels.
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.config.time_zone = time_zone;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<SummaryConfig, ConfigError> {
        let config = self.config;
        if config.latency_metrics.is_empty() {
            return Err(ConfigError::NoLatencyMetrics);
        }
        if config
            .latency_metrics
            .iter()
            .chain([&config.error_metric, &config.request_metric])
            .any(|name| name.is_empty())
        {
            return Err(ConfigError::EmptyMetricName);
        }
        if config.latency_metrics.contains(&config.error_metric)
            || config.error_metric == config.request_metric
        {
            return Err(ConfigError::OverlappingMetric(config.error_metric));
        }
        if config.latency_metrics.contains(&config.request_metric) {
            return Err(ConfigError::OverlappingMetric(config.request_metric));
        }
        Ok(config)
    }
}

/// Why a [`SummaryConfig`] could not be built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The latency metric set is empty, so no row could ever be produced
    NoLatencyMetrics,
    /// A metric name is the empty string
    EmptyMetricName,
    /// A metric name is configured for more than one role
    OverlappingMetric(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLatencyMetrics => f.write_str("at least one latency metric is required"),
            Self::EmptyMetricName => f.write_str("metric names must not be empty"),
            Self::OverlappingMetric(name) => {
                write!(f, "metric `{name}` is configured for more than one role")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::{ConfigError, MetricKind, SummaryConfig};

    #[test]
    fn defaults_follow_k6_names() {
        let config = SummaryConfig::builder().build().unwrap();
        check!(config.route("http_req_duration") == Some(MetricKind::Latency));
        check!(config.route("errors") == Some(MetricKind::Error));
        check!(config.route("http_reqs") == Some(MetricKind::Requests));
        check!(config.route("iterations").is_none());
        check!(config.interval().as_secs() == 5);
    }

    #[test]
    fn replaced_latency_set() {
        let config = SummaryConfig::builder()
            .latency_metrics(["login_latency", "logout_latency"])
            .build()
            .unwrap();
        check!(config.route("http_req_duration").is_none());
        check!(config.route("logout_latency") == Some(MetricKind::Latency));
        check!(config.latency_metrics().collect::<Vec<_>>() == ["login_latency", "logout_latency"]);
    }

    #[test]
    fn overlapping_names_rejected() {
        let err = SummaryConfig::builder()
            .error_metric("http_reqs")
            .build()
            .unwrap_err();
        check!(err == ConfigError::OverlappingMetric("http_reqs".into()));

        let err = SummaryConfig::builder()
            .add_latency_metric("errors")
            .build()
            .unwrap_err();
        check!(err == ConfigError::OverlappingMetric("errors".into()));
    }

    #[test]
    fn empty_sets_and_names_rejected() {
        let err = SummaryConfig::builder()
            .latency_metrics(Vec::<String>::new())
            .build()
            .unwrap_err();
        check!(err == ConfigError::NoLatencyMetrics);

        let err = SummaryConfig::builder().request_metric("").build().unwrap_err();
        check!(err == ConfigError::EmptyMetricName);
    }
}
