//! Keys for time-bucketed aggregation

use std::fmt;
use std::num::NonZeroU32;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Width of a time bucket, in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BucketInterval(NonZeroU32);

impl BucketInterval {
    /// The interval used by every summary: 5 seconds.
    pub const FIVE_SECONDS: Self = Self(NonZeroU32::new(5).expect("known good"));

    /// Create an interval of `seconds` seconds. Returns `None` for zero.
    pub const fn from_secs(seconds: u32) -> Option<Self> {
        match NonZeroU32::new(seconds) {
            Some(seconds) => Some(Self(seconds)),
            None => None,
        }
    }

    /// Interval width in seconds.
    pub const fn as_secs(self) -> u32 {
        self.0.get()
    }

    /// Interval width in seconds, as a float.
    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.0.get())
    }
}

impl Default for BucketInterval {
    fn default() -> Self {
        Self::FIVE_SECONDS
    }
}

/// Key of a time bucket: the unix second at which the bucket starts.
///
/// Keys are always a multiple of the [`BucketInterval`] they were computed with, and
/// order the same way as the wall-clock windows they stand for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBucket(i64);

impl TimeBucket {
    /// The bucket containing the instant `unix_nanos` nanoseconds after the unix epoch.
    ///
    /// Flooring is exact and rounds towards negative infinity, so instants before the
    /// epoch land in the bucket that starts before them.
    pub fn containing(unix_nanos: i128, interval: BucketInterval) -> Self {
        let width = i128::from(interval.as_secs()) * NANOS_PER_SECOND;
        let start = unix_nanos.div_euclid(width) * i128::from(interval.as_secs());
        // i64 seconds covers ~292 billion years; anything outside is clamped
        Self(start.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// The bucket containing the unix second `unix_seconds`.
    pub fn containing_second(unix_seconds: i64, interval: BucketInterval) -> Self {
        Self::containing(i128::from(unix_seconds) * NANOS_PER_SECOND, interval)
    }

    /// First unix second covered by this bucket.
    pub const fn start_second(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
