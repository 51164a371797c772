// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable byte sink.

use super::zigzag_encode32;
use super::zigzag_encode64;

/// Generate big-endian write methods for fixed-width primitives.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.put(&value.to_be_bytes());
        }
    };
}

/// Byte sink backed by a `Vec<u8>`.
///
/// Writes happen at [`position`](Output::position). Moving the position back
/// with [`set_position`](Output::set_position) overwrites existing bytes;
/// writing past the end grows the buffer.
#[derive(Debug, Default, Clone)]
pub struct Output {
    buffer: Vec<u8>,
    position: usize,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Seek within the written region. Positions past the end are clamped.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.buffer.len());
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Drop everything and rewind to 0.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }

    fn put(&mut self, data: &[u8]) {
        let end = self.position + data.len();
        if self.position == self.buffer.len() {
            self.buffer.extend_from_slice(data);
        } else {
            let overlap = (self.buffer.len() - self.position).min(data.len());
            self.buffer[self.position..self.position + overlap].copy_from_slice(&data[..overlap]);
            self.buffer.extend_from_slice(&data[overlap..]);
        }
        self.position = end;
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.put(data);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    impl_write_be!(write_i8, i8);
    impl_write_be!(write_i16, i16);
    impl_write_be!(write_i32, i32);
    impl_write_be!(write_i64, i64);

    pub fn write_f32(&mut self, value: f32) {
        self.write_i32(value.to_bits() as i32);
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_i64(value.to_bits() as i64);
    }

    /// Write a 32-bit varint and return the number of bytes emitted.
    pub fn write_var_int(&mut self, value: i32, optimize_positive: bool) -> usize {
        let mut raw = if optimize_positive {
            value as u32
        } else {
            zigzag_encode32(value)
        };
        let mut scratch = [0u8; super::MAX_VAR_INT_BYTES];
        let mut len = 0;
        while raw >= 0x80 {
            scratch[len] = (raw as u8 & 0x7F) | 0x80;
            raw >>= 7;
            len += 1;
        }
        scratch[len] = raw as u8;
        len += 1;
        self.put(&scratch[..len]);
        len
    }

    /// Write a 64-bit varint and return the number of bytes emitted.
    pub fn write_var_long(&mut self, value: i64, optimize_positive: bool) -> usize {
        let mut raw = if optimize_positive {
            value as u64
        } else {
            zigzag_encode64(value)
        };
        let mut scratch = [0u8; super::MAX_VAR_LONG_BYTES];
        let mut len = 0;
        while raw >= 0x80 {
            scratch[len] = (raw as u8 & 0x7F) | 0x80;
            raw >>= 7;
            len += 1;
        }
        scratch[len] = raw as u8;
        len += 1;
        self.put(&scratch[..len]);
        len
    }

    /// Unsigned counts, ids and ordinals.
    pub fn write_var_u32(&mut self, value: u32) -> usize {
        self.write_var_int(value as i32, true)
    }

    /// `varint(len + 1)` then UTF-8 bytes; `None` is the single byte 0.
    pub fn write_string(&mut self, value: Option<&str>) {
        match value {
            None => {
                self.write_u8(0);
            }
            Some(s) => {
                self.write_var_u32(s.len() as u32 + 1);
                self.put(s.as_bytes());
            }
        }
    }

    /// Write the char's scalar value as a positive varint.
    pub fn write_char(&mut self, value: char) {
        self.write_var_u32(value as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_fixed_width_big_endian() {
        let mut out = Output::new();
        out.write_i16(0x0102);
        out.write_i32(0x0304_0506);
        out.write_i64(0x0708_090A_0B0C_0D0E);
        out.write_bool(true);
        out.write_i8(-1);
        assert_eq!(
            out.as_bytes(),
            &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 1, 0xFF]
        );
    }

    #[test]
    fn test_output_var_int_bytes() {
        let mut out = Output::new();
        assert_eq!(out.write_var_int(300, true), 2);
        assert_eq!(out.as_bytes(), &[0xAC, 0x02]);

        let mut out = Output::new();
        assert_eq!(out.write_var_int(-1, false), 1);
        assert_eq!(out.as_bytes(), &[0x01]);

        let mut out = Output::new();
        assert_eq!(out.write_var_int(-1, true), 5);
        assert_eq!(out.as_bytes(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_output_string_encoding() {
        let mut out = Output::new();
        out.write_string(None);
        out.write_string(Some(""));
        out.write_string(Some("hé"));
        assert_eq!(out.as_bytes(), &[0, 1, 4, b'h', 0xC3, 0xA9]);
    }

    #[test]
    fn test_output_set_position_overwrites() {
        let mut out = Output::new();
        out.write_bytes(&[1, 2, 3, 4]);
        out.set_position(1);
        out.write_bytes(&[9, 9, 9, 9]);
        assert_eq!(out.as_bytes(), &[1, 9, 9, 9, 9]);
        assert_eq!(out.position(), 5);

        out.set_position(100);
        assert_eq!(out.position(), 5);
    }
}
