// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Record timestamps and bucket labels
//!
//! Record times are read as naive wall-clock times: any UTC offset is dropped and the
//! remainder is interpreted in the configured [`TimeZone`]. Bucket labels go the other
//! way, from a unix second back to wall-clock time in the same zone.

use std::fmt;

use jiff::{Timestamp, civil, tz::TimeZone};
use perfsum_aggregation::TimeBucket;

/// Why a record timestamp could not be turned into an instant.
#[derive(Debug)]
pub enum TimestampError {
    /// The text is not an ISO-8601 date-time
    Parse {
        /// The original, unstripped text
        input: String,
        /// Parser error
        source: jiff::Error,
    },
    /// The wall-clock time does not map to an instant in the time zone
    Resolve {
        /// The parsed wall-clock time
        datetime: civil::DateTime,
        /// Time zone error
        source: jiff::Error,
    },
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { input, .. } => write!(f, "invalid timestamp `{input}`"),
            Self::Resolve { datetime, .. } => {
                write!(f, "timestamp `{datetime}` does not exist in the time zone")
            }
        }
    }
}

impl std::error::Error for TimestampError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } | Self::Resolve { source, .. } => Some(source),
        }
    }
}

/// Drop a trailing UTC offset (`Z`, `+07:00`, `-0500`, ...) from an ISO-8601 date-time.
///
/// Only the part after the date/time separator is searched, so the dashes of the date are
/// never mistaken for an offset. Text without a separator is returned unchanged.
///
/// ```
/// use perfsum::timestamp::strip_offset;
///
/// assert_eq!(strip_offset("2024-01-01T00:00:01.5+07:00"), "2024-01-01T00:00:01.5");
/// assert_eq!(strip_offset("2024-01-01T00:00:01Z"), "2024-01-01T00:00:01");
/// assert_eq!(strip_offset("2024-01-01"), "2024-01-01");
/// ```
pub fn strip_offset(input: &str) -> &str {
    let input = input.trim();
    let Some(separator) = input.find(['T', 't', ' ']) else {
        return input;
    };
    let time = &input[separator + 1..];
    match time.find(['+', '-', 'Z', 'z']) {
        Some(offset) => &input[..separator + 1 + offset],
        None => input,
    }
}

/// Parse a record timestamp as wall-clock time in `time_zone`.
///
/// Wall-clock times that fall in a DST gap or fold resolve the same way a naive local
/// time does on most systems: gaps move forward, folds take the earlier instant.
pub fn parse_point_time(input: &str, time_zone: &TimeZone) -> Result<Timestamp, TimestampError> {
    let datetime: civil::DateTime = strip_offset(input)
        .parse()
        .map_err(|source| TimestampError::Parse {
            input: input.to_owned(),
            source,
        })?;
    time_zone
        .to_ambiguous_timestamp(datetime)
        .compatible()
        .map_err(|source| TimestampError::Resolve { datetime, source })
}

/// Wall-clock label of a bucket, e.g. `2024-01-01T00:00:00`.
///
/// Falls back to the raw unix second for buckets outside the supported date range.
pub fn bucket_label(bucket: TimeBucket, time_zone: &TimeZone) -> String {
    match Timestamp::from_second(bucket.start_second()) {
        Ok(start) => time_zone.to_datetime(start).to_string(),
        Err(_) => bucket.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use jiff::tz::{Offset, TimeZone};
    use perfsum_aggregation::{BucketInterval, TimeBucket};
    use rstest::rstest;

    use super::{bucket_label, parse_point_time, strip_offset};

    #[rstest]
    #[case("2024-01-01T00:00:01", "2024-01-01T00:00:01")]
    #[case("2024-01-01T00:00:01+07:00", "2024-01-01T00:00:01")]
    #[case("2024-01-01T00:00:01-05:00", "2024-01-01T00:00:01")]
    #[case("2024-01-01T00:00:01.123456789+0700", "2024-01-01T00:00:01.123456789")]
    #[case("2024-01-01T00:00:01Z", "2024-01-01T00:00:01")]
    #[case("2024-01-01 00:00:01+07", "2024-01-01 00:00:01")]
    #[case("  2024-01-01T00:00:01Z\n", "2024-01-01T00:00:01")]
    fn strips_offsets(#[case] input: &str, #[case] expected: &str) {
        check!(strip_offset(input) == expected);
    }

    #[test]
    fn offset_is_ignored_not_applied() {
        let with_offset = parse_point_time("2024-01-01T00:00:01+07:00", &TimeZone::UTC).unwrap();
        let without = parse_point_time("2024-01-01T00:00:01", &TimeZone::UTC).unwrap();
        check!(with_offset == without);
        check!(without.as_second() == 1_704_067_201);
    }

    #[test]
    fn naive_time_uses_configured_zone() {
        let plus_seven = TimeZone::fixed(Offset::constant(7));
        let ts = parse_point_time("2024-01-01T07:00:00", &plus_seven).unwrap();
        check!(ts.as_second() == 1_704_067_200);
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let ts = parse_point_time("2024-01-01T00:00:04.999+00:00", &TimeZone::UTC).unwrap();
        check!(ts.as_millisecond() == 1_704_067_204_999);
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("2024-13-01T00:00:00")]
    #[case("2024-01-01T25:00:00")]
    fn garbage_is_rejected(#[case] input: &str) {
        let err = parse_point_time(input, &TimeZone::UTC).unwrap_err();
        check!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn labels_render_wall_clock_time() {
        let bucket = TimeBucket::containing_second(1_704_067_203, BucketInterval::FIVE_SECONDS);
        check!(bucket_label(bucket, &TimeZone::UTC) == "2024-01-01T00:00:00");

        let plus_seven = TimeZone::fixed(Offset::constant(7));
        check!(bucket_label(bucket, &plus_seven) == "2024-01-01T07:00:00");
    }
}
