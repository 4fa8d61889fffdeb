// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Number rendering shared by the formats

/// Round `value` to `places` decimal places.
///
/// Rounding works on the exact decimal expansion of the binary value, so `2.675`
/// (stored as `2.67499999...`) rounds down to `2.67`. Non-finite values are returned
/// unchanged.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Append `value` in shortest round-trip form. Whole numbers keep a trailing `.0`.
pub(crate) fn push_float(buf: &mut String, value: f64) {
    let mut ryu_buf = ryu::Buffer::new();
    buf.push_str(ryu_buf.format(value));
}

pub(crate) fn push_unsigned(buf: &mut String, value: u64) {
    buf.push_str(itoa::Buffer::new().format(value));
}
