// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! Writer-side interface for perfsum summaries.
//!
//! A [`Row`] describes one output record as named [values](Value). A [`Format`] turns
//! rows into bytes, and [`FormatExt::output_to`] binds a format to an IO destination,
//! giving a [`RowIoStream`].
//!
//! ```
//! use perfsum_writer::{Csv, FormatExt, Row, RowIoStream, RowWriter};
//!
//! struct Sample(f64);
//!
//! impl Row for Sample {
//!     fn write<'a>(&'a self, writer: &mut impl RowWriter<'a>) {
//!         writer.value("value", self.0);
//!     }
//! }
//!
//! let mut stream = Csv::new(["value"]).output_to(Vec::new());
//! stream.next(&Sample(1.5)).unwrap();
//! stream.flush().unwrap();
//! assert_eq!(stream.into_inner(), b"value\n1.5\n");
//! ```

pub mod csv;
pub mod format;
mod row;
pub mod stream;
mod validate;
pub mod value;

pub use self::csv::Csv;
pub use format::{Format, FormatExt, FormattedRowIoStream};
pub use row::{Row, RowWriter, Value};
pub use stream::{IoStreamError, NullRowIoStream, RowIoStream};
pub use validate::{Mismatch, ValidationError, ValidationErrorBuilder};
