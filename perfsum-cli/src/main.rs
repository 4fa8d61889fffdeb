// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use perfsum::batch::output_file_name;
use perfsum::{ResultsLayout, SummaryConfig, Target, convert_file, run_target};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;

use cli::{Cli, Command};
use config::{FileConfig, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(Totals { failed: 0, .. }) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Default)]
struct Totals {
    converted: usize,
    empty: usize,
    failed: usize,
}

fn run(cli: Cli) -> Result<Totals> {
    let file = match &cli.summary.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(file, &cli.summary)?;

    match cli.command {
        Command::Convert { input, output } => {
            let output = match output {
                Some(output) => output,
                None => default_output(&input)?,
            };
            convert(&input, &output, &settings.summary)
        }
        Command::Batch {
            targets,
            results_dir,
        } => {
            let root = results_dir
                .or(settings.results_dir)
                .unwrap_or_else(|| PathBuf::from(ResultsLayout::DEFAULT_ROOT));
            Ok(batch(
                &ResultsLayout::new(root),
                &selected(targets),
                &settings.summary,
            ))
        }
    }
}

fn default_output(input: &Path) -> Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("`{}` is not a file path", input.display()))?;
    Ok(input.with_file_name(output_file_name(name)))
}

fn convert(input: &Path, output: &Path, config: &SummaryConfig) -> Result<Totals> {
    let report = convert_file(input, output, config)
        .with_context(|| format!("failed to convert `{}`", input.display()))?;
    let mut totals = Totals::default();
    if report.is_empty() {
        totals.empty += 1;
    } else {
        totals.converted += 1;
    }
    Ok(totals)
}

/// Requested targets in first-seen order, or every target when none were given.
fn selected(targets: Vec<Target>) -> Vec<Target> {
    if targets.is_empty() {
        return Target::ALL.to_vec();
    }
    let mut unique = Vec::with_capacity(targets.len());
    for target in targets {
        if !unique.contains(&target) {
            unique.push(target);
        }
    }
    unique
}

fn batch(layout: &ResultsLayout, targets: &[Target], config: &SummaryConfig) -> Totals {
    let mut totals = Totals::default();
    for &target in targets {
        match run_target(layout, target, config) {
            Ok(report) => {
                totals.converted += report.converted();
                totals.empty += report.empty();
                totals.failed += report.failures();
            }
            Err(err) => {
                warn!(%target, "{:#}", anyhow::Error::new(err));
                totals.failed += 1;
            }
        }
    }
    info!(
        root = %layout.root().display(),
        converted = totals.converted,
        empty = totals.empty,
        failed = totals.failed,
        "batch finished"
    );
    totals
}
