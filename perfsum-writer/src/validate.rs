// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// One way a [`Row`](crate::Row) can disagree with the columns of a format.
///
/// Positions are 0-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// The field at `position` is named differently from the column there
    Misnamed {
        /// Column position
        position: usize,
        /// Column name
        expected: String,
        /// Field name
        found: String,
    },
    /// The row ended before this column
    Missing {
        /// Column position
        position: usize,
        /// Column name
        expected: String,
    },
    /// The row has a field past the last column
    Unexpected {
        /// Field position
        position: usize,
        /// Field name
        found: String,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Misnamed {
                position,
                expected,
                found,
            } => write!(f, "column {position}: expected `{expected}`, found `{found}`"),
            Self::Missing { position, expected } => {
                write!(f, "column {position}: missing `{expected}`")
            }
            Self::Unexpected { position, found } => {
                write!(f, "column {position}: unexpected field `{found}`")
            }
        }
    }
}

/// Why a row can't be written by a format. Holds every [`Mismatch`] found, in column
/// order.
///
/// Errors are free to allocate; this is not the happy path.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidationError(Vec<Mismatch>);

impl ValidationError {
    /// Start collecting mismatches. See [`ValidationErrorBuilder::build`].
    pub fn builder() -> ValidationErrorBuilder {
        ValidationErrorBuilder::default()
    }

    /// Every mismatch, in column order.
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.0
    }
}

impl fmt::Debug for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("row does not match the columns")?;
        for (i, mismatch) in self.0.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            fmt::Display::fmt(mismatch, f)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects [mismatches](Mismatch) and bundles them into a single [`ValidationError`].
#[derive(Debug, Clone, Default)]
pub struct ValidationErrorBuilder(Vec<Mismatch>);

impl ValidationErrorBuilder {
    /// Record one mismatch.
    pub fn push(&mut self, mismatch: Mismatch) -> &mut Self {
        self.0.push(mismatch);
        self
    }

    /// [`Ok`] if nothing was recorded, otherwise [`Err`] with every mismatch.
    pub fn build(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::{Mismatch, ValidationError};

    #[test]
    fn empty_builder_is_ok() {
        check!(ValidationError::builder().build().is_ok());
    }

    #[test]
    fn lists_every_mismatch() {
        let mut builder = ValidationError::builder();
        builder
            .push(Mismatch::Misnamed {
                position: 1,
                expected: "avg".into(),
                found: "mean".into(),
            })
            .push(Mismatch::Missing {
                position: 2,
                expected: "rps".into(),
            });
        let err = builder.build().unwrap_err();
        check!(err.mismatches().len() == 2);
        check!(
            err.to_string()
                == "row does not match the columns: column 1: expected `avg`, found `mean`; \
                    column 2: missing `rps`"
        );
        check!(format!("{err:?}").contains("Misnamed"));
    }
}
