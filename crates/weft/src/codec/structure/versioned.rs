// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Version-gated structural codec.
//!
//! The type version is the highest `since` among the members and is written
//! once as `varint(version + 1)`, followed by the members in alphabetical
//! order. Members newer than the stream version are not read and keep their
//! default. Outside compatible mode any version difference is an
//! [`ErrorKind::VersionMismatch`].

use super::{copy_members, expect_object, instantiate, read_member, write_member};
use crate::codec::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};
use crate::io::{Input, Output};
use crate::types::{ClassDef, Member, TypeHandle};
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct VersionFieldCodec {
    class: Arc<ClassDef>,
    members: Arc<[Member]>,
    version: u32,
}

impl VersionFieldCodec {
    pub fn new(engine: &Engine, class: &Arc<ClassDef>) -> Self {
        let members = engine.members(class);
        let version = members.iter().map(|m| m.field.since).max().unwrap_or(0);
        Self {
            class: Arc::clone(class),
            members,
            version,
        }
    }

    pub fn type_version(&self) -> u32 {
        self.version
    }
}

impl Codec for VersionFieldCodec {
    fn name(&self) -> &'static str {
        "VersionFieldCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let obj = expect_object(&self.class, value)?;
        out.write_var_u32(self.version + 1);
        for member in self.members.iter() {
            write_member(engine, ctx, out, member, &obj.get(member.slot))
                .map_err(|e| e.with_trace(member.trace_entry()))?;
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
        let stream = match input.read_var_u32()? {
            0 => {
                return Err(Error::invalid_data(format!(
                    "missing version for {}",
                    self.class.name()
                )))
            }
            encoded => encoded - 1,
        };
        if stream != self.version {
            if !engine.config().versioned.compatible {
                return Err(ErrorKind::VersionMismatch {
                    class: self.class.name().to_owned(),
                    stream,
                    local: self.version,
                }
                .into());
            }
            if stream > self.version {
                log::warn!(
                    "[versioned] {} stream version {} is newer than local {}",
                    self.class.name(),
                    stream,
                    self.version
                );
            }
        }

        let obj = instantiate(engine, ctx, &self.class)?;
        for member in self.members.iter().filter(|m| m.field.since <= stream) {
            let member_value = read_member(engine, ctx, input, member)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn test_type_version_is_highest_since() {
        let engine = Engine::new();
        let class = ClassDef::builder("Doc")
            .field("title", FieldType::Str)
            .versioned("author", FieldType::Str, 2)
            .versioned("pages", FieldType::Int, 1)
            .build();
        assert_eq!(VersionFieldCodec::new(&engine, &class).type_version(), 2);

        let plain = ClassDef::builder("Plain").field("a", FieldType::Int).build();
        assert_eq!(VersionFieldCodec::new(&engine, &plain).type_version(), 0);
    }

    #[test]
    fn test_missing_version_rejected() {
        let engine = Engine::new();
        let class = ClassDef::builder("Doc").field("a", FieldType::Int).build();
        let codec = VersionFieldCodec::new(&engine, &class);
        let err = codec
            .read(
                &engine,
                &mut ReadContext::new(),
                &mut Input::new(&[0]),
                &TypeHandle::from(&class),
            )
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidData(_)));
    }
}
