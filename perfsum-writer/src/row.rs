// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

/// A single value within a [`Row`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
    /// Free-form text, quoted by formats that need it
    Str(&'a str),
    /// A float, rendered in shortest round-trip form
    Float(f64),
    /// An unsigned integer
    Unsigned(u64),
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for Value<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u64> for Value<'_> {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

/// Something that can be written as one output record: an ordered list of named values.
///
/// ```
/// # use perfsum_writer::{Row, RowWriter};
/// struct Throughput {
///     label: String,
///     rps: f64,
/// }
///
/// impl Row for Throughput {
///     fn write<'a>(&'a self, writer: &mut impl RowWriter<'a>) {
///         writer.value("label", self.label.as_str());
///         writer.value("rps", self.rps);
///     }
/// }
/// ```
pub trait Row {
    /// Write every field of the row, in column order.
    fn write<'a>(&'a self, writer: &mut impl RowWriter<'a>);
}

impl<T: Row + ?Sized> Row for &T {
    fn write<'a>(&'a self, writer: &mut impl RowWriter<'a>) {
        (**self).write(writer)
    }
}

/// Receives the fields of a [`Row`].
pub trait RowWriter<'a> {
    /// Record the field `name` with `value`.
    fn value(&mut self, name: &'a str, value: impl Into<Value<'a>>);
}
