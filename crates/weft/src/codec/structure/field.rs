// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-order structural codec: members in alphabetical order, nothing
//! else on the wire. Reader and writer must agree on the class definition.

use super::{copy_members, expect_object, instantiate, read_member, write_member};
use crate::codec::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::Result;
use crate::io::{Input, Output};
use crate::types::{ClassDef, Member, TypeHandle};
use crate::value::Value;
use std::sync::Arc;

#[derive(Debug)]
pub struct FieldCodec {
    class: Arc<ClassDef>,
    members: Arc<[Member]>,
}

impl FieldCodec {
    pub fn new(engine: &Engine, class: &Arc<ClassDef>) -> Self {
        Self {
            class: Arc::clone(class),
            members: engine.members(class),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}

impl Codec for FieldCodec {
    fn name(&self) -> &'static str {
        "FieldCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let obj = expect_object(&self.class, value)?;
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
        let obj = instantiate(engine, ctx, &self.class)?;
        for member in self.members.iter() {
            let value = read_member(engine, ctx, input, member)
                .map_err(|e| e.with_trace(member.trace_entry()))?;
            obj.set(member.slot, value);
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
    use crate::types::{FieldDef, FieldType};
    use crate::value::{graph_eq, ObjectRef};
    use crate::ErrorKind;

    fn sample(engine: &Engine) -> Arc<ClassDef> {
        let class = ClassDef::builder("Sample")
            .field("count", FieldType::Int)
            .field("label", FieldType::Str)
            .field("ratio", FieldType::Double)
            .member(FieldDef::new("cache", FieldType::Any).transient())
            .build();
        engine.register(&class).expect("register");
        class
    }

    #[test]
    fn test_field_codec_writes_members_alphabetically() {
        let engine = Engine::new();
        let class = sample(&engine);
        let obj = ObjectRef::new(&class)
            .with("count", 3)
            .and_then(|o| o.with("label", "ab"))
            .and_then(|o| o.with("ratio", 0.5f64))
            .and_then(|o| o.with("cache", 99))
            .expect("fill");

        let codec = FieldCodec::new(&engine, &class);
        let names: Vec<&str> = codec.members().iter().map(Member::name).collect();
        assert_eq!(names, vec!["count", "label", "ratio"]);

        let mut out = Output::new();
        codec
            .write(&engine, &mut WriteContext::new(), &mut out, &Value::Object(obj))
            .expect("write");
        // count varint, label (len+1, bytes), ratio big-endian.
        assert_eq!(
            out.as_bytes(),
            &[3, 3, b'a', b'b', 0x3F, 0xE0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_field_codec_skips_transient_members() {
        let engine = Engine::new();
        let class = sample(&engine);
        let obj = ObjectRef::new(&class).with("cache", 99).expect("fill");
        let bytes = engine.serialize(&Value::Object(obj)).expect("serialize");
        let decoded = engine.deserialize(&bytes).expect("deserialize");
        let decoded = decoded.as_object().expect("object");
        assert_eq!(decoded.get_field("cache").expect("cache"), Value::Null);
    }

    #[test]
    fn test_field_codec_error_trace_names_member() {
        let engine = Engine::new();
        let class = sample(&engine);
        let obj = ObjectRef::new(&class).with("count", "three").expect("fill");
        let err = engine.serialize(&Value::Object(obj)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
        assert_eq!(err.trace(), &["count (Sample)".to_owned()]);
    }

    #[test]
    fn test_field_codec_copy_is_deep() {
        let engine = Engine::new();
        let class = sample(&engine);
        let obj = ObjectRef::new(&class).with("label", "x").expect("fill");
        let original = Value::Object(obj);
        let copy = engine.copy(&original).expect("copy");
        assert!(graph_eq(&copy, &original));
        assert_ne!(copy, original);
    }
}
