// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use perfsum::{ErrorSignalMode, Target};

#[derive(Debug, Parser)]
#[command(
    name = "perfsum",
    version,
    about = "Summarize k6 JSON output into 5-second CSV reports"
)]
pub struct Cli {
    #[command(flatten)]
    pub summary: SummaryArgs,

    /// Log more (repeat for trace output). Overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand. Each one overrides the config file.
#[derive(Debug, Default, Args)]
pub struct SummaryArgs {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Metric whose values are latencies (repeatable, replaces the default set)
    #[arg(long = "latency-metric", global = true, value_name = "NAME")]
    pub latency_metrics: Vec<String>,

    /// Metric whose values are error indicators
    #[arg(long, global = true, value_name = "NAME")]
    pub error_metric: Option<String>,

    /// Metric whose values are request counts
    #[arg(long, global = true, value_name = "NAME")]
    pub request_metric: Option<String>,

    /// How error values accumulate: `count` (values > 0) or `sum`
    #[arg(long, global = true, value_name = "MODE")]
    pub error_signal: Option<ErrorSignalMode>,

    /// Time zone for naive timestamps and bucket labels: an IANA name, `UTC` or `local`
    #[arg(long, global = true, value_name = "TZ")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a single JSON file
    Convert {
        /// Line-delimited JSON input
        input: PathBuf,
        /// CSV output (default: next to the input, `_json.json` renamed to `_csv.csv`)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Convert every file under `<results-dir>/<target>/json`
    Batch {
        /// Target to convert (repeatable; default: all)
        #[arg(long = "target", value_name = "NAME")]
        targets: Vec<Target>,
        /// Results root
        #[arg(long, value_name = "DIR")]
        results_dir: Option<PathBuf>,
    },
}
