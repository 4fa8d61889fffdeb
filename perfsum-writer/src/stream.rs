// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains the [`RowIoStream`] trait and the errors it reports

use std::{fmt, io};

use crate::{Row, ValidationError};

/// The error cases for a [`RowIoStream::next`] call.
#[derive(Debug)]
pub enum IoStreamError {
    /// The row does not fit the format
    Validation(ValidationError),
    /// Writing to the underlying destination failed
    Io(io::Error),
}

impl fmt::Display for IoStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => fmt::Display::fmt(err, f),
            Self::Io(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for IoStreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for IoStreamError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ValidationError> for IoStreamError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Writes a stream of [rows](`Row`) to an output IO sink.
///
/// Most code gets a `RowIoStream` by calling [`FormatExt::output_to`](crate::FormatExt::output_to).
///
/// Anything a format needs to write after the last row (such as a header for an empty
/// table) is written by [`RowIoStream::flush`], so callers must flush before dropping.
pub trait RowIoStream {
    /// Write the next [`Row`] to the stream.
    ///
    /// If an [`IoStreamError::Io`] occurs, the result of the following call is undefined.
    fn next(&mut self, row: &impl Row) -> Result<(), IoStreamError>;

    /// Finish any pending output and flush it to the final IO sink.
    fn flush(&mut self) -> io::Result<()>;
}

/// A RowIoStream that drops all rows sent to it
#[derive(Default, Copy, Clone, Debug)]
#[non_exhaustive]
pub struct NullRowIoStream;

impl RowIoStream for NullRowIoStream {
    fn next(&mut self, _row: &impl Row) -> Result<(), IoStreamError> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
