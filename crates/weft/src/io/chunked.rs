// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Chunked framing: a payload is written as a sequence of
//! `varint(len) bytes[len]` chunks closed by a zero-length chunk, so a
//! reader can step over it without understanding its content.

use super::{Input, Output};
use crate::error::{Error, Result};

/// Frame `data` into chunks of at most `chunk_size` bytes.
pub fn write_chunked(out: &mut Output, data: &[u8], chunk_size: usize) {
    for chunk in data.chunks(chunk_size.max(1)) {
        out.write_var_u32(chunk.len() as u32);
        out.write_bytes(chunk);
    }
    out.write_var_u32(0);
}

/// Collect the payload of one chunked frame.
pub fn read_chunked(input: &mut Input<'_>) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    loop {
        let len = chunk_len(input)?;
        if len == 0 {
            return Ok(payload);
        }
        payload.extend_from_slice(input.read_bytes(len)?);
    }
}

/// Step over one chunked frame without copying it.
pub fn skip_chunked(input: &mut Input<'_>) -> Result<()> {
    loop {
        let len = chunk_len(input)?;
        if len == 0 {
            return Ok(());
        }
        input.skip(len)?;
    }
}

fn chunk_len(input: &mut Input<'_>) -> Result<usize> {
    let offset = input.position();
    let len = input.read_var_int(true)?;
    if len < 0 {
        return Err(Error::invalid_data(format!(
            "negative chunk length {} at offset {}",
            len, offset
        )));
    }
    Ok(len as usize)
}
