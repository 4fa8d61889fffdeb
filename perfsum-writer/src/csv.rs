// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Comma-separated values output
//!
//! The header row is written once, before the first row, or by the final flush when no
//! row was written at all. Every row must carry exactly the configured columns, in
//! order; anything else is rejected with a [`ValidationError`] listing every
//! [`Mismatch`] before a byte is written.

use std::borrow::Cow;
use std::io;

use ::csv::{Terminator, WriterBuilder};
use smallvec::SmallVec;

use crate::{
    Row, RowWriter, Value,
    format::Format,
    stream::IoStreamError,
    validate::{Mismatch, ValidationError},
    value::{push_float, push_unsigned},
};

/// CSV [`Format`] with a fixed set of columns.
#[derive(Clone, Debug)]
pub struct Csv {
    columns: Vec<Cow<'static, str>>,
    header_written: bool,
    line: Vec<u8>,
    field: String,
}

impl Csv {
    /// Create a CSV format whose rows carry exactly `columns`, in this order.
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Cow<'static, str>>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            header_written: false,
            line: Vec::new(),
            field: String::new(),
        }
    }

    /// The configured columns.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| &**c)
    }

    fn validate(&self, fields: &[(&str, Value<'_>)]) -> Result<(), ValidationError> {
        let mut builder = ValidationError::builder();
        for (position, column) in self.columns.iter().enumerate() {
            match fields.get(position) {
                Some((name, _)) if *name == &**column => {}
                Some((name, _)) => {
                    builder.push(Mismatch::Misnamed {
                        position,
                        expected: column.to_string(),
                        found: (*name).to_owned(),
                    });
                }
                None => {
                    builder.push(Mismatch::Missing {
                        position,
                        expected: column.to_string(),
                    });
                }
            }
        }
        for (position, (name, _)) in fields.iter().enumerate().skip(self.columns.len()) {
            builder.push(Mismatch::Unexpected {
                position,
                found: (*name).to_owned(),
            });
        }
        builder.build()
    }
}

struct Collect<'a>(SmallVec<[(&'a str, Value<'a>); 8]>);

impl<'a> RowWriter<'a> for Collect<'a> {
    fn value(&mut self, name: &'a str, value: impl Into<Value<'a>>) {
        self.0.push((name, value.into()));
    }
}

// Records are terminated by a bare `\n` regardless of platform.
fn line_writer(line: &mut Vec<u8>) -> ::csv::Writer<&mut Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .buffer_capacity(256)
        .from_writer(line)
}

fn write_header(
    writer: &mut ::csv::Writer<&mut Vec<u8>>,
    columns: &[Cow<'static, str>],
) -> io::Result<()> {
    writer
        .write_record(columns.iter().map(|c| c.as_bytes()))
        .map_err(io::Error::from)
}

impl Format for Csv {
    fn format(
        &mut self,
        row: &impl Row,
        output: &mut impl io::Write,
    ) -> Result<(), IoStreamError> {
        let mut fields = Collect(SmallVec::new());
        row.write(&mut fields);
        self.validate(&fields.0)?;

        self.line.clear();
        let mut writer = line_writer(&mut self.line);
        if !self.header_written {
            write_header(&mut writer, &self.columns)?;
        }
        for (_, value) in &fields.0 {
            let field: &str = match *value {
                Value::Str(s) => s,
                Value::Float(f) => {
                    self.field.clear();
                    push_float(&mut self.field, f);
                    &self.field
                }
                Value::Unsigned(u) => {
                    self.field.clear();
                    push_unsigned(&mut self.field, u);
                    &self.field
                }
            };
            writer.write_field(field).map_err(io::Error::from)?;
        }
        writer
            .write_record(None::<&[u8]>)
            .map_err(io::Error::from)?;
        writer.flush()?;
        drop(writer);

        output.write_all(&self.line)?;
        self.header_written = true;
        Ok(())
    }

    fn finish(&mut self, output: &mut impl io::Write) -> io::Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.line.clear();
        let mut writer = line_writer(&mut self.line);
        write_header(&mut writer, &self.columns)?;
        writer.flush()?;
        drop(writer);

        output.write_all(&self.line)?;
        self.header_written = true;
        Ok(())
    }
}
