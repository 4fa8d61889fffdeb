// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::{fmt, io};

use perfsum_writer::IoStreamError;

/// Why converting one source failed.
///
/// Record-level problems never show up here; they are counted in the
/// [`FileReport`](crate::pipeline::FileReport) instead.
#[derive(Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// The input file could not be opened
    Open {
        /// Input path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// Reading the input failed part way through
    Read(io::Error),
    /// The output file could not be created
    Create {
        /// Output path
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
    /// Writing the summary failed
    Write(IoStreamError),
    /// The output path names the input file
    SameFile {
        /// Input path
        path: PathBuf,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, .. } => write!(f, "failed to open `{}`", path.display()),
            Self::Read(_) => f.write_str("failed to read input"),
            Self::Create { path, .. } => write!(f, "failed to create `{}`", path.display()),
            Self::Write(_) => f.write_str("failed to write summary"),
            Self::SameFile { path } => {
                write!(f, "refusing to overwrite input `{}`", path.display())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Create { source, .. } | Self::Read(source) => {
                Some(source)
            }
            Self::Write(err) => Some(err),
            Self::SameFile { .. } => None,
        }
    }
}

impl From<IoStreamError> for PipelineError {
    fn from(value: IoStreamError) -> Self {
        Self::Write(value)
    }
}
