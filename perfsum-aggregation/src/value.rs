//! Strategies for aggregating scalar values
//!
//! Request totals and error signals are both plain scalars per bucket. They differ only
//! in how a new observation is folded in, which is what [`AggregateValue`] captures.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Defines how individual observations are folded into an accumulator.
pub trait AggregateValue {
    /// The accumulated type
    type Aggregated: Default;

    /// Fold `value` into `accum`.
    fn add_value(accum: &mut Self::Aggregated, value: f64);
}

/// Sums values when aggregating
///
/// Use for request counts or any measurement where the bucket total is what matters.
pub struct Sum;

impl AggregateValue for Sum {
    type Aggregated = f64;

    fn add_value(accum: &mut f64, value: f64) {
        *accum += value;
    }
}

/// Counts observations whose value is strictly positive
///
/// Useful for rate-style metrics that emit `1` on failure and `0` on success.
pub struct CountPositive;

impl AggregateValue for CountPositive {
    type Aggregated = u64;

    fn add_value(accum: &mut u64, value: f64) {
        if value > 0.0 {
            *accum += 1;
        }
    }
}

/// How error observations are accumulated into a bucket's error signal.
///
/// The two policies only agree when every error value is `0` or `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSignalMode {
    /// Count error observations with a value greater than zero.
    #[default]
    Count,
    /// Sum the values of all error observations.
    Sum,
}

impl ErrorSignalMode {
    /// Name used in configuration files and on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Sum => "sum",
        }
    }
}

impl fmt::Display for ErrorSignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown [`ErrorSignalMode`] name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownErrorSignalMode(String);

impl fmt::Display for UnknownErrorSignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown error signal mode `{}`, expected `count` or `sum`",
            self.0
        )
    }
}

impl std::error::Error for UnknownErrorSignalMode {}

impl FromStr for ErrorSignalMode {
    type Err = UnknownErrorSignalMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Self::Count),
            "sum" => Ok(Self::Sum),
            other => Err(UnknownErrorSignalMode(other.to_owned())),
        }
    }
}

/// Per-bucket error signal, accumulated under a single [`ErrorSignalMode`].
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorSignal {
    /// Number of positive error observations
    Count(<CountPositive as AggregateValue>::Aggregated),
    /// Sum of error observation values
    Sum(<Sum as AggregateValue>::Aggregated),
}

impl ErrorSignal {
    /// An empty signal for `mode`.
    pub fn new(mode: ErrorSignalMode) -> Self {
        match mode {
            ErrorSignalMode::Count => Self::Count(Default::default()),
            ErrorSignalMode::Sum => Self::Sum(Default::default()),
        }
    }

    /// Fold one error observation into the signal.
    pub fn add_value(&mut self, value: f64) {
        match self {
            Self::Count(count) => CountPositive::add_value(count, value),
            Self::Sum(sum) => Sum::add_value(sum, value),
        }
    }

    /// Current value of the signal.
    pub fn value(&self) -> f64 {
        match self {
            Self::Count(count) => *count as f64,
            Self::Sum(sum) => *sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::{ErrorSignal, ErrorSignalMode};

    #[test]
    fn count_ignores_zero_and_negative() {
        let mut signal = ErrorSignal::new(ErrorSignalMode::Count);
        for v in [1.0, 0.0, 3.0, -1.0, 0.5] {
            signal.add_value(v);
        }
        check!(signal.value() == 3.0);
    }

    #[test]
    fn sum_adds_every_value() {
        let mut signal = ErrorSignal::new(ErrorSignalMode::Sum);
        for v in [1.0, 0.0, 3.0, -1.0, 0.5] {
            signal.add_value(v);
        }
        check!(signal.value() == 3.5);
    }

    #[test]
    fn parses_mode_names() {
        check!("count".parse::<ErrorSignalMode>() == Ok(ErrorSignalMode::Count));
        check!("sum".parse::<ErrorSignalMode>() == Ok(ErrorSignalMode::Sum));
        let err = "ratio".parse::<ErrorSignalMode>().unwrap_err();
        check!(err.to_string().contains("`ratio`"));
        check!(ErrorSignalMode::default() == ErrorSignalMode::Count);
    }
}
