// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The [`Format`] trait and its binding to an IO destination

use std::io;

use crate::{
    Row,
    stream::{IoStreamError, RowIoStream},
};

/// Turns [rows](`Row`) into bytes.
pub trait Format {
    /// Core format API that writes `row` to the given `output` IO destination.
    ///
    /// A row that fails validation must leave `output` untouched.
    fn format(&mut self, row: &impl Row, output: &mut impl io::Write)
    -> Result<(), IoStreamError>;

    /// Write anything still owed to `output` once no more rows will follow.
    ///
    /// Called on every flush, so it must be idempotent.
    fn finish(&mut self, output: &mut impl io::Write) -> io::Result<()> {
        let _ = output;
        Ok(())
    }
}

/// Extension methods available on every [`Format`].
pub trait FormatExt: Format {
    /// Bind the format to an `output` IO destination to create a [`RowIoStream`].
    fn output_to<O>(self, output: O) -> FormattedRowIoStream<Self, O>
    where
        Self: Sized,
    {
        FormattedRowIoStream {
            format: self,
            output,
        }
    }
}
impl<T: Format + ?Sized> FormatExt for T {}

/// See [`FormatExt::output_to`].
#[derive(Debug)]
pub struct FormattedRowIoStream<F, O> {
    format: F,
    output: O,
}

impl<F, O> FormattedRowIoStream<F, O> {
    /// Give back the IO destination. Call [`RowIoStream::flush`] first.
    pub fn into_inner(self) -> O {
        self.output
    }
}

impl<F: Format, O: io::Write> RowIoStream for FormattedRowIoStream<F, O> {
    fn next(&mut self, row: &impl Row) -> Result<(), IoStreamError> {
        self.format.format(row, &mut self.output)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.format.finish(&mut self.output)?;
        self.output.flush()
    }
}
