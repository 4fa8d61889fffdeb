// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! `perfsum.toml` loading and merging with command-line options

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jiff::tz::TimeZone;
use perfsum::{ErrorSignalMode, SummaryConfig};
use serde::Deserialize;

use crate::cli::SummaryArgs;

/// Contents of a configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub latency_metrics: Option<Vec<String>>,
    pub error_metric: Option<String>,
    pub request_metric: Option<String>,
    pub error_signal: Option<ErrorSignalMode>,
    pub time_zone: Option<String>,
    pub results_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file `{}`", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Everything a run needs, after the config file and the flags have been merged.
#[derive(Debug)]
pub struct Settings {
    pub summary: SummaryConfig,
    pub results_dir: Option<PathBuf>,
}

impl Settings {
    /// Merge `file` with `args`; flags win over file values.
    pub fn resolve(file: FileConfig, args: &SummaryArgs) -> Result<Self> {
        let mut builder = SummaryConfig::builder();

        if !args.latency_metrics.is_empty() {
            builder = builder.latency_metrics(args.latency_metrics.iter().cloned());
        } else if let Some(metrics) = file.latency_metrics {
            builder = builder.latency_metrics(metrics);
        }
        if let Some(metric) = args.error_metric.clone().or(file.error_metric) {
            builder = builder.error_metric(metric);
        }
        if let Some(metric) = args.request_metric.clone().or(file.request_metric) {
            builder = builder.request_metric(metric);
        }

        if let Some(mode) = args.error_signal.or(file.error_signal) {
            builder = builder.error_signal_mode(mode);
        }

        if let Some(name) = args.time_zone.as_deref().or(file.time_zone.as_deref()) {
            builder = builder.time_zone(resolve_time_zone(name)?);
        }

        Ok(Self {
            summary: builder.build().context("invalid configuration")?,
            results_dir: file.results_dir,
        })
    }
}

/// `local` is the system time zone, `UTC` is always available, anything else is looked
/// up in the time zone database.
pub fn resolve_time_zone(name: &str) -> Result<TimeZone> {
    if name.eq_ignore_ascii_case("local") {
        Ok(TimeZone::system())
    } else if name.eq_ignore_ascii_case("utc") {
        Ok(TimeZone::UTC)
    } else {
        TimeZone::get(name).with_context(|| format!("unknown time zone `{name}`"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use assert2::check;
    use jiff::tz::TimeZone;
    use perfsum::{ErrorSignalMode, MetricKind};
    use rstest::rstest;

    use super::{FileConfig, Settings, resolve_time_zone};
    use crate::cli::SummaryArgs;

    const FULL: &str = r#"
        latency_metrics = ["login", "checkout"]
        error_metric = "failed"
        request_metric = "reqs"
        error_signal = "sum"
        time_zone = "UTC"
        results_dir = "out/results"
    "#;

    #[test]
    fn parses_every_key() {
        let file = FileConfig::parse(FULL).unwrap();
        check!(
            file == FileConfig {
                latency_metrics: Some(vec!["login".into(), "checkout".into()]),
                error_metric: Some("failed".into()),
                request_metric: Some("reqs".into()),
                error_signal: Some(ErrorSignalMode::Sum),
                time_zone: Some("UTC".into()),
                results_dir: Some("out/results".into()),
            }
        );
    }

    #[test]
    fn empty_file_is_default() {
        check!(FileConfig::parse("").unwrap() == FileConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = FileConfig::parse("interval = 10\n").unwrap_err();
        check!(err.to_string().contains("interval"));
    }

    #[test]
    fn file_values_apply() {
        let settings =
            Settings::resolve(FileConfig::parse(FULL).unwrap(), &SummaryArgs::default()).unwrap();
        let summary = &settings.summary;
        check!(summary.route("login") == Some(MetricKind::Latency));
        check!(summary.route("http_req_duration").is_none());
        check!(summary.route("failed") == Some(MetricKind::Error));
        check!(summary.route("reqs") == Some(MetricKind::Requests));
        check!(summary.error_signal_mode() == ErrorSignalMode::Sum);
        check!(summary.time_zone() == &TimeZone::UTC);
        check!(settings.results_dir.as_deref() == Some(Path::new("out/results")));
    }

    #[test]
    fn flags_override_file() {
        let args = SummaryArgs {
            latency_metrics: vec!["ttfb".into()],
            error_metric: Some("errs".into()),
            error_signal: Some(ErrorSignalMode::Count),
            ..SummaryArgs::default()
        };
        let settings = Settings::resolve(FileConfig::parse(FULL).unwrap(), &args).unwrap();
        let summary = &settings.summary;
        check!(summary.latency_metrics().collect::<Vec<_>>() == ["ttfb"]);
        check!(summary.route("login").is_none());
        check!(summary.error_metric() == "errs");
        check!(summary.request_metric() == "reqs");
        check!(summary.error_signal_mode() == ErrorSignalMode::Count);
    }

    #[test]
    fn bad_values_are_fatal() {
        let err = FileConfig::parse("error_signal = \"max\"").unwrap_err();
        check!(err.to_string().contains("unknown variant `max`"));
        check!(err.span().is_some());

        let file = FileConfig::parse("error_metric = \"http_reqs\"").unwrap();
        let err = Settings::resolve(file, &SummaryArgs::default()).unwrap_err();
        check!(format!("{err:#}").contains("more than one role"));

        check!(resolve_time_zone("Not/AZone").is_err());
    }

    #[rstest]
    #[case("UTC")]
    #[case("utc")]
    #[case("Utc")]
    fn utc_needs_no_database(#[case] name: &str) {
        check!(resolve_time_zone(name).unwrap() == TimeZone::UTC);
    }

    #[test]
    fn local_is_always_available() {
        check!(resolve_time_zone("local").is_ok());
        check!(resolve_time_zone("LOCAL").is_ok());
    }
}
