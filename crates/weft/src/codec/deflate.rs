// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Raw-deflate wrapper around another codec.
//!
//! The inner codec writes into a scratch buffer, which is compressed and
//! written as `varint(len) bytes[len]`. The same call context is shared with
//! the inner codec, so references inside the compressed block resolve
//! against the rest of the graph.

use super::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};
use crate::io::{Input, Output};
use crate::types::TypeHandle;
use crate::value::Value;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DeflateCodec {
    inner: Arc<dyn Codec>,
    level: u32,
}

impl DeflateCodec {
    pub fn new(inner: Arc<dyn Codec>) -> Self {
        Self { inner, level: 6 }
    }

    /// Compression level, 0 (store) to 9 (best).
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }
}

impl Codec for DeflateCodec {
    fn name(&self) -> &'static str {
        "DeflateCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let mut scratch = Output::with_capacity(256);
        self.inner.write(engine, ctx, &mut scratch, value)?;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder.write_all(scratch.as_bytes())?;
        let compressed = encoder.finish()?;

        log::trace!(
            "[deflate] {} bytes -> {} bytes",
            scratch.len(),
            compressed.len()
        );
        out.write_var_u32(compressed.len() as u32);
        out.write_bytes(&compressed);
        Ok(())
    }

    fn read(
        &self,
        engine: &Engine,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        let len = input.read_var_u32()? as usize;
        let compressed = input.read_bytes(len)?;
        let limit = engine.config().max_inflated_size;
        let mut inflated = Vec::new();
        DeflateDecoder::new(compressed)
            .take((limit as u64).saturating_add(1))
            .read_to_end(&mut inflated)
            .map_err(|e| Error::invalid_data(format!("corrupt deflate block: {}", e)))?;
        if inflated.len() > limit {
            return Err(ErrorKind::InflateLimitExceeded { limit }.into());
        }

        let mut block = Input::new(&inflated);
        let value = self.inner.read(engine, ctx, &mut block, ty)?;
        if !block.is_eof() {
            return Err(Error::invalid_data(format!(
                "{} trailing bytes in deflate block",
                block.remaining()
            )));
        }
        Ok(value)
    }

    fn copy(&self, engine: &Engine, ctx: &mut CopyContext, value: &Value) -> Result<Value> {
        self.inner.copy(engine, ctx, value)
    }

    fn accepts_null(&self) -> bool {
        self.inner.accepts_null()
    }

    fn is_immutable(&self) -> bool {
        self.inner.is_immutable()
    }

    fn is_leaf(&self) -> bool {
        self.inner.is_leaf()
    }

    fn instantiates(&self) -> bool {
        self.inner.instantiates()
    }
}
