// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Batch conversion over a results directory tree
//!
//! Under a results root, the raw output of each [`Target`] lives in `<root>/<target>/json`
//! and its summaries are written to `<root>/<target>/csv`.

use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::SummaryConfig;
use crate::error::PipelineError;
use crate::pipeline::{FileReport, convert_file};

/// A load balancer whose results are summarized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// NGINX
    Nginx,
    /// Traefik
    Traefik,
    /// HAProxy
    Haproxy,
    /// Apache APISIX
    Apisix,
}

impl Target {
    /// Every target, in processing order.
    pub const ALL: [Target; 4] = [Self::Nginx, Self::Traefik, Self::Haproxy, Self::Apisix];

    /// Directory name of the target.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nginx => "nginx",
            Self::Traefik => "traefik",
            Self::Haproxy => "haproxy",
            Self::Apisix => "apisix",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = InvalidTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| InvalidTarget(s.to_owned()))
    }
}

/// A target name outside the allow-list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidTarget(pub String);

impl fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid target `{}`, expected one of ", self.0)?;
        for (i, target) in Target::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "`{target}`")?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidTarget {}

/// Locations of inputs and outputs under a results root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsLayout {
    root: PathBuf,
}

impl ResultsLayout {
    /// Directory name of the default results root.
    pub const DEFAULT_ROOT: &'static str = "results";

    /// Use `root` as the results root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The results root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the raw output of `target` lives.
    pub fn input_dir(&self, target: Target) -> PathBuf {
        self.root.join(target.as_str()).join("json")
    }

    /// Where the summaries of `target` are written.
    pub fn output_dir(&self, target: Target) -> PathBuf {
        self.root.join(target.as_str()).join("csv")
    }
}

impl Default for ResultsLayout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROOT)
    }
}

/// Name of the summary written for an input file name.
///
/// A `_json.json` suffix becomes `_csv.csv` and a `.json` extension becomes `.csv`. Any
/// other name gets `.csv` appended, so the summary never lands on its own input.
///
/// ```
/// use std::ffi::OsStr;
/// use std::path::Path;
/// use perfsum::batch::output_file_name;
///
/// assert_eq!(output_file_name(OsStr::new("run1_json.json")), Path::new("run1_csv.csv"));
/// assert_eq!(output_file_name(OsStr::new("run1.json")), Path::new("run1.csv"));
/// assert_eq!(output_file_name(OsStr::new("run1.csv")), Path::new("run1.csv.csv"));
/// ```
pub fn output_file_name(input: &OsStr) -> PathBuf {
    if let Some(stem) = input.to_str().and_then(|name| name.strip_suffix("_json.json")) {
        return PathBuf::from(format!("{stem}_csv.csv"));
    }
    let input = Path::new(input);
    if input.extension().is_some_and(|ext| ext == "json") {
        return input.with_extension("csv");
    }
    let mut name = input.as_os_str().to_owned();
    name.push(".csv");
    PathBuf::from(name)
}

/// `.json` files directly inside `dir`, sorted by file name. Symlinks to files count.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut inputs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        // `is_file` follows symlinks and is false for dangling ones
        if entry.path().extension().is_some_and(|ext| ext == "json")
            && entry.path().is_file()
        {
            inputs.push(entry.into_path());
        }
    }
    Ok(inputs)
}

/// How one file of a batch ended.
#[derive(Debug)]
pub enum FileOutcome {
    /// A summary with at least one row was written
    Converted(FileReport),
    /// A header-only summary was written
    Empty(FileReport),
    /// Nothing usable was written
    Failed(PipelineError),
}

impl FileOutcome {
    /// Whether the file failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One input file of a batch and its outcome.
#[derive(Debug)]
pub struct FileResult {
    /// Input path
    pub input: PathBuf,
    /// Output path
    pub output: PathBuf,
    /// What happened
    pub outcome: FileOutcome,
}

/// Outcome of every file of one target.
#[derive(Debug)]
pub struct TargetReport {
    /// The target
    pub target: Target,
    /// Whether the input directory was missing, in which case `files` is empty
    pub missing_input_dir: bool,
    /// Per-file results, in processing order
    pub files: Vec<FileResult>,
}

impl TargetReport {
    /// Number of files that failed.
    pub fn failures(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_failure()).count()
    }

    /// Number of files that produced a summary with rows.
    pub fn converted(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Converted(_)))
            .count()
    }

    /// Number of files that produced a header-only summary.
    pub fn empty(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Empty(_)))
            .count()
    }
}

/// Errors that stop a whole target.
#[derive(Debug)]
pub enum BatchError {
    /// Listing the input directory failed
    Discover {
        /// Input directory
        dir: PathBuf,
        /// Underlying error
        source: walkdir::Error,
    },
    /// The output directory could not be created
    CreateOutputDir {
        /// Output directory
        dir: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discover { dir, .. } => write!(f, "failed to list `{}`", dir.display()),
            Self::CreateOutputDir { dir, .. } => {
                write!(f, "failed to create directory `{}`", dir.display())
            }
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discover { source, .. } => Some(source),
            Self::CreateOutputDir { source, .. } => Some(source),
        }
    }
}

/// Convert every input file of `target`.
///
/// A missing input directory is reported through
/// [`TargetReport::missing_input_dir`]; a file that fails is recorded and the remaining
/// files are still converted.
pub fn run_target(
    layout: &ResultsLayout,
    target: Target,
    config: &SummaryConfig,
) -> Result<TargetReport, BatchError> {
    let input_dir = layout.input_dir(target);
    let mut report = TargetReport {
        target,
        missing_input_dir: false,
        files: Vec::new(),
    };
    if !input_dir.is_dir() {
        warn!(%target, dir = %input_dir.display(), "input directory not found, skipping");
        report.missing_input_dir = true;
        return Ok(report);
    }

    let inputs = discover_inputs(&input_dir).map_err(|source| BatchError::Discover {
        dir: input_dir.clone(),
        source,
    })?;
    if inputs.is_empty() {
        info!(%target, dir = %input_dir.display(), "no input files");
        return Ok(report);
    }

    let output_dir = layout.output_dir(target);
    fs::create_dir_all(&output_dir).map_err(|source| BatchError::CreateOutputDir {
        dir: output_dir.clone(),
        source,
    })?;

    for input in inputs {
        let Some(name) = input.file_name() else {
            continue;
        };
        let output = output_dir.join(output_file_name(name));
        let outcome = match convert_file(&input, &output, config) {
            Ok(file) if file.is_empty() => FileOutcome::Empty(file),
            Ok(file) => FileOutcome::Converted(file),
            Err(error) => {
                warn!(%target, input = %input.display(), ?error, "conversion failed");
                FileOutcome::Failed(error)
            }
        };
        report.files.push(FileResult {
            input,
            output,
            outcome,
        });
    }

    info!(
        %target,
        converted = report.converted(),
        empty = report.empty(),
        failed = report.failures(),
        "target done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::Path;

    use assert2::check;
    use rstest::rstest;

    use super::{InvalidTarget, ResultsLayout, Target, output_file_name};

    #[rstest]
    #[case("nginx", Target::Nginx)]
    #[case("traefik", Target::Traefik)]
    #[case("haproxy", Target::Haproxy)]
    #[case("apisix", Target::Apisix)]
    fn parses_allowed_targets(#[case] name: &str, #[case] target: Target) {
        check!(name.parse::<Target>() == Ok(target));
        check!(target.to_string() == name);
    }

    #[rstest]
    #[case("envoy")]
    #[case("NGINX")]
    #[case("")]
    #[case("nginx ")]
    fn rejects_other_targets(#[case] name: &str) {
        let err = name.parse::<Target>().unwrap_err();
        check!(err == InvalidTarget(name.to_owned()));
        check!(
            err.to_string()
                == format!(
                    "invalid target `{name}`, expected one of `nginx`, `traefik`, `haproxy`, `apisix`"
                )
        );
    }

    #[rstest]
    #[case("run_json.json", "run_csv.csv")]
    #[case("run.json", "run.csv")]
    #[case("_json.json", "_csv.csv")]
    #[case("run.v2.json", "run.v2.csv")]
    #[case("json_run.json", "json_run.csv")]
    #[case("run.csv", "run.csv.csv")]
    #[case("run", "run.csv")]
    #[case("run.JSON", "run.JSON.csv")]
    fn names_outputs(#[case] input: &str, #[case] expected: &str) {
        check!(output_file_name(OsStr::new(input)) == Path::new(expected));
    }

    #[test]
    fn layout_paths() {
        let layout = ResultsLayout::new("/data");
        check!(layout.input_dir(Target::Haproxy) == Path::new("/data/haproxy/json"));
        check!(layout.output_dir(Target::Haproxy) == Path::new("/data/haproxy/csv"));
        check!(ResultsLayout::default().root() == Path::new("results"));
    }
}
