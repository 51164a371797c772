// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tag-keyed structural codec.
//!
//! Only members carrying a tag are serialized. Wire form:
//! `varint(present + 1)` then, per non-null member, `varint(tag)` and the
//! value. Tags must be unique across the class hierarchy.
//!
//! With `tagged.write_value_class` each value is preceded by its class, so
//! a reader can decode and drop tags it does not know when
//! `tagged.skip_unknown_tags` is also set. Otherwise an unknown tag is a
//! hard error.

use super::{
    copy_members, expect_object, instantiate, read_member, read_member_with_class, write_member,
    write_member_with_class,
};
use crate::codec::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};
use crate::io::{Input, Output};
use crate::types::{ClassDef, Member, TypeHandle};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct TaggedFieldCodec {
    class: Arc<ClassDef>,
    members: Arc<[Member]>,
    by_tag: HashMap<u32, usize>,
}

impl TaggedFieldCodec {
    /// Fails with [`ErrorKind::DuplicateTag`] if two members share a tag.
    pub fn new(engine: &Engine, class: &Arc<ClassDef>) -> Result<Self> {
        let members: Arc<[Member]> = engine
            .members(class)
            .iter()
            .filter(|m| m.field.tag.is_some())
            .cloned()
            .collect();

        let mut by_tag = HashMap::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let Some(tag) = member.field.tag else { continue };
            if let Some(&first) = by_tag.get(&tag) {
                let first: &Member = &members[first];
                return Err(ErrorKind::DuplicateTag {
                    class: class.name().to_owned(),
                    tag,
                    first: first.trace_entry(),
                    second: member.trace_entry(),
                }
                .into());
            }
            by_tag.insert(tag, index);
        }

        Ok(Self {
            class: Arc::clone(class),
            members,
            by_tag,
        })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

impl Codec for TaggedFieldCodec {
    fn name(&self) -> &'static str {
        "TaggedFieldCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let obj = expect_object(&self.class, value)?;
        let present: Vec<(&Member, Value)> = self
            .members
            .iter()
            .map(|member| (member, obj.get(member.slot)))
            .filter(|(_, v)| !v.is_null())
            .collect();

        let with_class = engine.config().tagged.write_value_class;
        out.write_var_u32(present.len() as u32 + 1);
        for (member, member_value) in &present {
            let tag = member.field.tag.unwrap_or_default();
            out.write_var_u32(tag);
            let written = if with_class {
                write_member_with_class(engine, ctx, out, member, member_value)
            } else {
                write_member(engine, ctx, out, member, member_value)
            };
            written.map_err(|e| e.with_trace(member.trace_entry()))?;
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
        let count = input.read_var_u32()?;
        if count == 0 {
            return Err(Error::invalid_data(format!(
                "zero member count for tagged {}",
                self.class.name()
            )));
        }

        let config = &engine.config().tagged;
        let obj = instantiate(engine, ctx, &self.class)?;
        for _ in 1..count {
            let tag = input.read_var_u32()?;
            let Some(&index) = self.by_tag.get(&tag) else {
                if config.skip_unknown_tags && config.write_value_class {
                    engine.read_class_and_object(ctx, input)?;
                    log::debug!("[tagged] dropped unknown tag {} of {}", tag, self.class.name());
                    continue;
                }
                return Err(ErrorKind::UnknownTag {
                    class: self.class.name().to_owned(),
                    tag,
                }
                .into());
            };
            let member = &self.members[index];
            let member_value = if config.write_value_class {
                read_member_with_class(engine, ctx, input, member)
            } else {
                read_member(engine, ctx, input, member)
            }
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
    use crate::value::ObjectRef;

    #[test]
    fn test_duplicate_tag_across_hierarchy() {
        let engine = Engine::new();
        let base = ClassDef::builder("Base")
            .tagged("id", FieldType::Int, 1)
            .build();
        let derived = ClassDef::builder("Derived")
            .extends(&base)
            .tagged("name", FieldType::Str, 1)
            .build();
        let err = TaggedFieldCodec::new(&engine, &derived).unwrap_err();
        match err.kind() {
            ErrorKind::DuplicateTag { tag, first, second, .. } => {
                assert_eq!(*tag, 1);
                assert_eq!(first, "id (Base)");
                assert_eq!(second, "name (Derived)");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.category(), crate::ErrorCategory::Configuration);
    }

    #[test]
    fn test_untagged_and_null_members_not_written() {
        let engine = Engine::new();
        let class = ClassDef::builder("Record")
            .tagged("id", FieldType::Int, 3)
            .tagged("note", FieldType::Str, 4)
            .field("scratch", FieldType::Int)
            .build();
        let codec = TaggedFieldCodec::new(&engine, &class).expect("codec");
        assert_eq!(codec.members().len(), 2);

        let obj = ObjectRef::new(&class)
            .with("id", 5)
            .and_then(|o| o.with("scratch", 9))
            .expect("fill");
        let mut out = Output::new();
        codec
            .write(&engine, &mut WriteContext::new(), &mut out, &Value::Object(obj))
            .expect("write");
        assert_eq!(out.as_bytes(), &[2, 3, 5]);
    }

    #[test]
    fn test_zero_count_rejected() {
        let engine = Engine::new();
        let class = ClassDef::builder("Record")
            .tagged("id", FieldType::Int, 3)
            .build();
        let codec = TaggedFieldCodec::new(&engine, &class).expect("codec");
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
