// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Named-schema structural codec.
//!
//! The first instance of a class in a stream is preceded by its schema,
//! `varint(count)` then each member name. Every member value is written in
//! a chunked frame, so a reader that does not know a member steps over it.
//! Members are matched by name; local members missing from the stream keep
//! their default value.
//!
//! Skipping is only safe when the skipped frame holds no tracked object and
//! no first schema emission, since both advance per-stream state the reader
//! would then miss. With `compatible.write_value_class` every value carries
//! its class and unknown frames are decoded and dropped instead.

use super::{
    copy_members, expect_object, instantiate, read_member, read_member_with_class, write_member,
    write_member_with_class,
};
use crate::codec::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::io::{read_chunked, skip_chunked, write_chunked, Input, Output};
use crate::types::{ClassDef, Member, TypeHandle};
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct CompatibleFieldCodec {
    class: Arc<ClassDef>,
    members: Arc<[Member]>,
}

impl CompatibleFieldCodec {
    pub fn new(engine: &Engine, class: &Arc<ClassDef>) -> Self {
        Self {
            class: Arc::clone(class),
            members: engine.members(class),
        }
    }

    /// Map stream member order onto local members. Each name binds the first
    /// unused local member of that name.
    fn read_schema(&self, input: &mut Input<'_>) -> Result<Arc<[Option<usize>]>> {
        let count = input.read_var_u32()? as usize;
        if count > input.remaining() {
            return Err(Error::invalid_data(format!(
                "schema of {} declares {} members with {} bytes left",
                self.class.name(),
                count,
                input.remaining()
            )));
        }
        let mut used = vec![false; self.members.len()];
        let mut mapping = Vec::with_capacity(count);
        for _ in 0..count {
            let name = input
                .read_string()?
                .ok_or_else(|| Error::invalid_data("null member name in schema"))?;
            let local =
                (0..self.members.len()).find(|&i| !used[i] && self.members[i].name() == name);
            match local {
                Some(i) => used[i] = true,
                None => log::debug!(
                    "[compatible] stream member {}.{} unknown locally",
                    self.class.name(),
                    name
                ),
            }
            mapping.push(local);
        }
        Ok(mapping.into())
    }
}

/// A member value must fill its frame exactly.
fn expect_frame_consumed(frame: &Input<'_>) -> Result<()> {
    if frame.is_eof() {
        return Ok(());
    }
    Err(Error::invalid_data(format!(
        "{} bytes left in member frame",
        frame.remaining()
    )))
}

impl Codec for CompatibleFieldCodec {
    fn name(&self) -> &'static str {
        "CompatibleFieldCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let obj = expect_object(&self.class, value)?;
        if ctx.mark_schema_written(self.class.name()) {
            log::debug!(
                "[compatible] schema for {} ({} members)",
                self.class.name(),
                self.members.len()
            );
            out.write_var_u32(self.members.len() as u32);
            for member in self.members.iter() {
                out.write_string(Some(member.name()));
            }
        }

        let config = &engine.config().compatible;
        let mut scratch = Output::new();
        for member in self.members.iter() {
            scratch.clear();
            let member_value = obj.get(member.slot);
            let written = if config.write_value_class {
                write_member_with_class(engine, ctx, &mut scratch, member, &member_value)
            } else {
                write_member(engine, ctx, &mut scratch, member, &member_value)
            };
            written.map_err(|e| e.with_trace(member.trace_entry()))?;
            write_chunked(out, scratch.as_bytes(), config.chunk_size);
        }
        Ok(())
    }

    fn read(
        &self,
        engine: &Engine,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        _ty: &TypeHandle,
    ) -> Result<Value> {
        let mapping = match ctx.schema(self.class.name()) {
            Some(mapping) => mapping,
            None => {
                let mapping = self.read_schema(input)?;
                ctx.store_schema(self.class.name(), Arc::clone(&mapping));
                mapping
            }
        };

        let with_class = engine.config().compatible.write_value_class;
        let obj = instantiate(engine, ctx, &self.class)?;
        for (index, local) in mapping.iter().enumerate() {
            let Some(local) = *local else {
                if with_class {
                    let payload = read_chunked(input)?;
                    let mut frame = Input::new(&payload);
                    engine.read_class_and_object(ctx, &mut frame)?;
                    expect_frame_consumed(&frame)?;
                } else {
                    skip_chunked(input)?;
                }
                log::debug!(
                    "[compatible] dropped stream member #{} of {}",
                    index,
                    self.class.name()
                );
                continue;
            };
            let member = &self.members[local];
            let payload = read_chunked(input)?;
            let mut frame = Input::new(&payload);
            let read = if with_class {
                read_member_with_class(engine, ctx, &mut frame, member)
            } else {
                read_member(engine, ctx, &mut frame, member)
            };
            let member_value = read
                .and_then(|value| expect_frame_consumed(&frame).map(|()| value))
                .map_err(|e| e.with_trace(member.trace_entry()))?;
            obj.set(member.slot, member_value);
        }
        Ok(Value::Object(obj))
    }

    fn copy(&self, engine: &Engine, ctx: &mut CopyContext, value: &Value) -> Result<Value> {
        copy_members(engine, ctx, &self.class, &self.members, value)
    }

    fn instantiates(&self) -> bool {
        true
    }
}
