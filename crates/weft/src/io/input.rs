// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked byte source over a borrowed slice.

use super::{zigzag_decode32, zigzag_decode64, MAX_VAR_INT_BYTES, MAX_VAR_LONG_BYTES};
use crate::error::{Error, ErrorKind, Result};

/// Generate big-endian read methods for fixed-width primitives.
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type> {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Byte source reading from a borrowed slice.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Input<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.buffer.len() {
            return Err(ErrorKind::BufferUnderflow {
                offset: self.offset,
                needed: position - self.buffer.len(),
            }
            .into());
        }
        self.offset = position;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(ErrorKind::BufferUnderflow {
                offset: self.offset,
                needed: len - self.remaining(),
            }
            .into());
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::invalid_data(format!(
                "boolean byte {} at offset {}",
                other,
                self.offset - 1
            ))),
        }
    }

    impl_read_be!(read_i8, i8, 1);
    impl_read_be!(read_i16, i16, 2);
    impl_read_be!(read_i32, i32, 4);
    impl_read_be!(read_i64, i64, 8);

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_i32()? as u32))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    pub fn read_var_int(&mut self, optimize_positive: bool) -> Result<i32> {
        let start = self.offset;
        let mut raw: u32 = 0;
        for group in 0..MAX_VAR_INT_BYTES {
            let byte = self.read_u8()?;
            raw |= u32::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(if optimize_positive {
                    raw as i32
                } else {
                    zigzag_decode32(raw)
                });
            }
        }
        Err(ErrorKind::MalformedVarInt {
            offset: start,
            max_bytes: MAX_VAR_INT_BYTES,
        }
        .into())
    }

    pub fn read_var_long(&mut self, optimize_positive: bool) -> Result<i64> {
        let start = self.offset;
        let mut raw: u64 = 0;
        for group in 0..MAX_VAR_LONG_BYTES {
            let byte = self.read_u8()?;
            raw |= u64::from(byte & 0x7F) << (7 * group);
            if byte & 0x80 == 0 {
                return Ok(if optimize_positive {
                    raw as i64
                } else {
                    zigzag_decode64(raw)
                });
            }
        }
        Err(ErrorKind::MalformedVarInt {
            offset: start,
            max_bytes: MAX_VAR_LONG_BYTES,
        }
        .into())
    }

    pub fn read_var_u32(&mut self) -> Result<u32> {
        Ok(self.read_var_int(true)? as u32)
    }

    /// Inverse of [`Output::write_string`](super::Output::write_string).
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let prefix = self.read_var_u32()?;
        if prefix == 0 {
            return Ok(None);
        }
        let start = self.offset;
        let bytes = self.read_bytes((prefix - 1) as usize)?;
        if bytes.is_ascii() {
            return Ok(Some(bytes.iter().map(|&b| b as char).collect()));
        }
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(Some(s.to_owned())),
            Err(_) => Err(ErrorKind::InvalidUtf8 { offset: start }.into()),
        }
    }

    pub fn read_char(&mut self) -> Result<char> {
        let offset = self.offset;
        let scalar = self.read_var_u32()?;
        char::from_u32(scalar).ok_or_else(|| {
            Error::invalid_data(format!(
                "char scalar {:#x} at offset {} is not a valid code point",
                scalar, offset
            ))
        })
    }
}
