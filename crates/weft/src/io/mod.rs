// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive codec: byte sink/source with fixed-width, varint and string
//! encodings.
//!
//! Fixed-width values are big-endian. Variable-length integers are split
//! into 7-bit groups, least significant first, with the high bit of each
//! byte set when more bytes follow. Signed values are either written as-is
//! ("optimize positive", small non-negative values are short) or zig-zag
//! transformed so that small magnitudes of either sign are short.

mod chunked;
mod input;
mod output;

pub use chunked::{read_chunked, skip_chunked, write_chunked};
pub use input::Input;
pub use output::Output;

/// Maximum bytes of a 32-bit varint.
pub const MAX_VAR_INT_BYTES: usize = 5;
/// Maximum bytes of a 64-bit varint.
pub const MAX_VAR_LONG_BYTES: usize = 10;

#[inline]
pub(crate) fn zigzag_encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub(crate) fn zigzag_decode32(raw: u32) -> i32 {
    ((raw >> 1) as i32) ^ -((raw & 1) as i32)
}

#[inline]
pub(crate) fn zigzag_encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub(crate) fn zigzag_decode64(raw: u64) -> i64 {
    ((raw >> 1) as i64) ^ -((raw & 1) as i64)
}

/// Number of bytes `write_var_int(value, optimize_positive)` produces.
pub fn var_int_length(value: i32, optimize_positive: bool) -> usize {
    let raw = if optimize_positive {
        value as u32
    } else {
        zigzag_encode32(value)
    };
    match raw {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0xFFF_FFFF => 4,
        _ => 5,
    }
}

/// Number of bytes `write_var_long(value, optimize_positive)` produces.
pub fn var_long_length(value: i64, optimize_positive: bool) -> usize {
    let mut raw = if optimize_positive {
        value as u64
    } else {
        zigzag_encode64(value)
    };
    let mut len = 1;
    while raw >= 0x80 {
        raw >>= 7;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_int_length_bands() {
        let bands: [(i32, usize); 10] = [
            (0, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (2_097_151, 3),
            (2_097_152, 4),
            (268_435_455, 4),
            (268_435_456, 5),
            (-1, 5),
        ];
        for (value, expected) in bands {
            assert_eq!(var_int_length(value, true), expected, "value {}", value);
        }
    }

    #[test]
    fn test_var_int_length_zigzag_centers_on_zero() {
        assert_eq!(var_int_length(-1, false), 1);
        assert_eq!(var_int_length(-64, false), 1);
        assert_eq!(var_int_length(63, false), 1);
        assert_eq!(var_int_length(64, false), 2);
        assert_eq!(var_int_length(-65, false), 2);
        assert_eq!(var_int_length(i32::MIN, false), 5);
    }

    #[test]
    fn test_var_long_length_extremes() {
        assert_eq!(var_long_length(0, true), 1);
        assert_eq!(var_long_length(i64::MAX, true), 9);
        assert_eq!(var_long_length(-1, true), 10);
        assert_eq!(var_long_length(-1, false), 1);
        assert_eq!(var_long_length(i64::MIN, false), 10);
    }

    #[test]
    fn test_zigzag_symmetry() {
        for value in [0, 1, -1, 2, -2, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode32(zigzag_encode32(value)), value);
        }
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        for value in [0i64, -1, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode64(zigzag_encode64(value)), value);
        }
    }
}
