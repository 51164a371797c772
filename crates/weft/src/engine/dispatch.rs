// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class tokens, reference markers and codec dispatch.
//!
//! # Wire forms
//!
//! | Position | References on | References off |
//! |----------|---------------|----------------|
//! | root | class, body (tracked root takes ordinal 1 silently) | class, body |
//! | class-and-object | marker, then class + body when marker is 0 | class, body |
//! | fixed type, tracked | marker, then body when marker is 0 | body |
//! | fixed type, nullable | presence byte, then as above | presence byte, body |
//!
//! A marker `k > 0` is a back-reference to ordinal `k`; ordinals are handed
//! out from 1 in the order objects are first written. Null in a
//! class-and-object position is class token 0.

use super::Engine;
use crate::codec::Codec;
use crate::config::{ABSENT, CLASS_ID_OFFSET, NAME_CLASS, NULL_CLASS, PRESENT, REF_NEW};
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::error::{Error, ErrorKind, Result};
use crate::io::{Input, Output};
use crate::registry::Registration;
use crate::types::{Builtin, TypeHandle};
use crate::value::Value;
use std::collections::HashSet;
use std::sync::Arc;

impl Engine {
    // ===== Class tokens =====

    /// Write the class token of `ty` (null token for `None`) and return the
    /// registration used.
    pub fn write_class(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        ty: Option<&TypeHandle>,
    ) -> Result<Option<Arc<Registration>>> {
        let Some(ty) = ty else {
            out.write_var_u32(NULL_CLASS);
            return Ok(None);
        };
        let registration = self.registration_for(ty)?;
        match registration.id() {
            Some(id) => {
                out.write_var_u32(id + CLASS_ID_OFFSET);
            }
            None => {
                out.write_var_u32(NAME_CLASS);
                let (name_id, first) = ctx.class_name_id(ty.name());
                out.write_var_u32(name_id);
                if first {
                    out.write_string(Some(ty.name()));
                }
            }
        }
        Ok(Some(registration))
    }

    /// Read a class token; `None` for the null token.
    pub fn read_class(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
    ) -> Result<Option<Arc<Registration>>> {
        match input.read_var_u32()? {
            NULL_CLASS => Ok(None),
            NAME_CLASS => {
                let name_id = input.read_var_u32()?;
                if let Some(registration) = ctx.class_by_name_id(name_id) {
                    return Ok(Some(registration));
                }
                let name = input
                    .read_string()?
                    .ok_or_else(|| Error::new(ErrorKind::UnknownClassNameId(name_id)))?;
                let registration = self.registration_for(&self.type_named(&name)?)?;
                ctx.bind_class_name_id(name_id, Arc::clone(&registration));
                Ok(Some(registration))
            }
            token => {
                let id = token - CLASS_ID_OFFSET;
                self.registry
                    .get_by_id(id)
                    .map(Some)
                    .ok_or_else(|| ErrorKind::UnknownClassId(id).into())
            }
        }
    }

    fn type_named(&self, name: &str) -> Result<TypeHandle> {
        if let Some(builtin) = Builtin::from_name(name) {
            return Ok(TypeHandle::Builtin(builtin));
        }
        self.registry
            .class(name)
            .map(TypeHandle::Class)
            .ok_or_else(|| ErrorKind::UnknownClassName(name.to_owned()).into())
    }

    // ===== Class-and-object positions =====

    /// Write `value` with its concrete class, preceded by a reference
    /// marker when references are enabled.
    pub fn write_class_and_object(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let ty = value.type_handle();
        if self.config.references {
            if let (Some(ty), Some(identity)) = (&ty, value.identity()) {
                if self.use_references(ty) {
                    if let Some(ordinal) = ctx.reference_of(identity) {
                        out.write_var_u32(ordinal);
                        return Ok(());
                    }
                    out.write_var_u32(REF_NEW);
                    let codec = self.write_registered_class(ctx, out, ty)?;
                    ctx.assign(identity);
                    return self.write_body(codec.as_ref(), ctx, out, value);
                }
            }
            out.write_var_u32(REF_NEW);
        }
        match self.write_class(ctx, out, ty.as_ref())? {
            Some(registration) => self.write_body(registration.codec().as_ref(), ctx, out, value),
            None => Ok(()),
        }
    }

    fn write_registered_class(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        ty: &TypeHandle,
    ) -> Result<Arc<dyn Codec>> {
        match self.write_class(ctx, out, Some(ty))? {
            Some(registration) => Ok(registration.codec()),
            None => Err(ErrorKind::NullNotAllowed.into()),
        }
    }

    pub fn read_class_and_object(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
    ) -> Result<Value> {
        if self.config.references {
            let marker = input.read_var_u32()?;
            if marker != REF_NEW {
                return ctx.resolve(marker);
            }
        }
        let Some(registration) = self.read_class(ctx, input)? else {
            return Ok(Value::Null);
        };
        self.read_registered(ctx, input, &registration)
    }

    /// Read the body of a value whose registration is known, tracking it
    /// when its type uses references.
    fn read_registered(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        registration: &Registration,
    ) -> Result<Value> {
        let codec = registration.codec();
        if self.use_references(registration.ty()) {
            self.read_tracked(codec.as_ref(), ctx, input, registration.ty())
        } else {
            self.read_body(codec.as_ref(), ctx, input, registration.ty())
        }
    }

    // ===== Fixed-type positions =====

    /// Write `value` as type `ty`, which the reader knows. Tracked types get
    /// a reference marker.
    pub fn write_object(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
        ty: &TypeHandle,
    ) -> Result<()> {
        let codec = self.codec_for(ty)?;
        if self.use_references(ty) {
            let identity = value.identity().ok_or_else(|| {
                if value.is_null() {
                    Error::new(ErrorKind::NullNotAllowed)
                } else {
                    Error::type_mismatch(ty.name(), value.type_name())
                }
            })?;
            if let Some(ordinal) = ctx.reference_of(identity) {
                out.write_var_u32(ordinal);
                return Ok(());
            }
            out.write_var_u32(REF_NEW);
            ctx.assign(identity);
        } else if value.is_null() && !codec.accepts_null() {
            return Err(ErrorKind::NullNotAllowed.into());
        }
        self.write_body(codec.as_ref(), ctx, out, value)
    }

    pub fn read_object(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        let codec = self.codec_for(ty)?;
        if self.use_references(ty) {
            let marker = input.read_var_u32()?;
            if marker != REF_NEW {
                return ctx.resolve(marker);
            }
            return self.read_tracked(codec.as_ref(), ctx, input, ty);
        }
        self.read_body(codec.as_ref(), ctx, input, ty)
    }

    /// Like [`write_object`](Self::write_object) but allows null: a presence
    /// byte is written first unless the codec encodes null itself.
    pub fn write_object_or_null(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
        ty: &TypeHandle,
    ) -> Result<()> {
        let codec = self.codec_for(ty)?;
        if codec.accepts_null() && !self.use_references(ty) {
            return self.write_body(codec.as_ref(), ctx, out, value);
        }
        if value.is_null() {
            out.write_u8(ABSENT);
            return Ok(());
        }
        out.write_u8(PRESENT);
        self.write_object(ctx, out, value, ty)
    }

    pub fn read_object_or_null(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        let codec = self.codec_for(ty)?;
        if codec.accepts_null() && !self.use_references(ty) {
            return self.read_body(codec.as_ref(), ctx, input, ty);
        }
        match input.read_u8()? {
            ABSENT => Ok(Value::Null),
            PRESENT => self.read_object(ctx, input, ty),
            other => Err(Error::invalid_data(format!(
                "presence byte {} at offset {}",
                other,
                input.position() - 1
            ))),
        }
    }

    // ===== Roots =====

    /// Write a root value: class token, then the body. A tracked root takes
    /// the first ordinal without a marker.
    pub fn write_root(&self, ctx: &mut WriteContext, out: &mut Output, value: &Value) -> Result<()> {
        self.validate_graph(value)?;
        let ty = value.type_handle();
        let Some(registration) = self.write_class(ctx, out, ty.as_ref())? else {
            return Ok(());
        };
        if self.use_references(registration.ty()) {
            if let Some(identity) = value.identity() {
                ctx.assign(identity);
            }
        }
        self.write_body(registration.codec().as_ref(), ctx, out, value)
    }

    pub fn read_root(&self, ctx: &mut ReadContext, input: &mut Input<'_>) -> Result<Value> {
        let Some(registration) = self.read_class(ctx, input)? else {
            return Ok(Value::Null);
        };
        self.read_registered(ctx, input, &registration)
    }

    /// Write a root of a type known to the reader: no class token.
    pub fn write_root_as(
        &self,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
        ty: &TypeHandle,
    ) -> Result<()> {
        self.validate_graph(value)?;
        let codec = self.codec_for(ty)?;
        if value.is_null() && !codec.accepts_null() {
            return Err(ErrorKind::NullNotAllowed.into());
        }
        if self.use_references(ty) {
            if let Some(identity) = value.identity() {
                ctx.assign(identity);
            }
        }
        self.write_body(codec.as_ref(), ctx, out, value)
    }

    pub fn read_root_as(
        &self,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        let registration = self.registration_for(ty)?;
        self.read_registered(ctx, input, &registration)
    }

    // ===== Copy =====

    /// Deep-copy `value` within an ongoing copy. Leaves are returned as is;
    /// an instance already copied in this call returns its copy.
    pub fn copy_value(&self, ctx: &mut CopyContext, value: &Value) -> Result<Value> {
        let Some(ty) = value.type_handle() else {
            return Ok(Value::Null);
        };
        if value.identity().is_none() {
            return Ok(value.clone());
        }
        if let Some(copy) = ctx.copy_of(value) {
            return Ok(copy);
        }
        let codec = self.codec_for(&ty)?;
        ctx.enter(self.config.max_depth)?;
        let copied = codec.copy(self, ctx, value);
        ctx.leave();
        let copy = copied?;
        ctx.reference(value, &copy);
        Ok(copy)
    }

    // ===== Bodies =====

    fn write_body(
        &self,
        codec: &dyn Codec,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        if codec.is_leaf() {
            return codec.write(self, ctx, out, value);
        }
        ctx.enter(self.config.max_depth)?;
        let result = codec.write(self, ctx, out, value);
        ctx.leave();
        result
    }

    fn read_body(
        &self,
        codec: &dyn Codec,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        if codec.is_leaf() {
            return codec.read(self, ctx, input, ty);
        }
        ctx.enter(self.config.max_depth)?;
        let result = codec.read(self, ctx, input, ty);
        ctx.leave();
        result
    }

    /// Read a body under a freshly reserved ordinal. The codec binds the
    /// instance early through [`ReadContext::reference`]; otherwise the
    /// result is bound once it returns.
    fn read_tracked(
        &self,
        codec: &dyn Codec,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value> {
        ctx.enter(self.config.max_depth)?;
        let ordinal = ctx.reserve();
        let result = codec.read(self, ctx, input, ty);
        ctx.leave();
        let value = result?;
        ctx.complete(ordinal, &value);
        Ok(value)
    }

    // ===== Closed registry =====

    /// With `registration_required`, fail before writing anything if any
    /// instance reachable from `value` has an unregistered class.
    fn validate_graph(&self, value: &Value) -> Result<()> {
        if !self.config.registration_required {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let mut pending = vec![value.clone()];
        while let Some(current) = pending.pop() {
            match &current {
                Value::Object(obj) => {
                    if !seen.insert(obj.addr()) {
                        continue;
                    }
                    let class = obj.class();
                    if self.registry.get(class.name()).is_none() {
                        return Err(ErrorKind::Unregistered(class.name().to_owned()).into());
                    }
                    pending.extend(self.members(&class).iter().map(|m| obj.get(m.slot)));
                }
                Value::List(list) => {
                    if seen.insert(list.addr()) {
                        pending.extend(list.items());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::{ClassDef, FieldType};
    use crate::value::ObjectRef;

    #[test]
    fn test_null_root_is_null_class_token() {
        let engine = Engine::new();
        let bytes = engine.serialize(&Value::Null).expect("serialize");
        assert_eq!(bytes, vec![0]);
        assert_eq!(engine.deserialize(&bytes).expect("deserialize"), Value::Null);
    }

    #[test]
    fn test_name_token_written_once_per_stream() {
        let engine = Engine::new();
        let tag = ClassDef::builder("Tag").build();
        let mut ctx = WriteContext::new();
        let mut out = Output::new();
        let ty = TypeHandle::from(&tag);
        engine.write_class(&mut ctx, &mut out, Some(&ty)).expect("first");
        engine.write_class(&mut ctx, &mut out, Some(&ty)).expect("second");
        assert_eq!(out.as_bytes(), &[1, 0, 4, b'T', b'a', b'g', 1, 0]);

        let bytes = out.into_bytes();
        let mut input = Input::new(&bytes);
        let mut rctx = ReadContext::new();
        for _ in 0..2 {
            let registration = engine
                .read_class(&mut rctx, &mut input)
                .expect("read")
                .expect("class");
            assert_eq!(registration.ty().name(), "Tag");
        }
        assert!(input.is_eof());
    }

    #[test]
    fn test_unknown_class_id() {
        let engine = Engine::new();
        let err = engine.deserialize(&[42]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownClassId(40)));
        let err = engine.deserialize(&[1, 3, 0]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownClassNameId(3)));
    }

    #[test]
    fn test_fixed_null_without_presence_is_rejected() {
        let engine = Engine::new();
        let point = ClassDef::builder("Point").final_class().build();
        engine.register(&point).expect("register");
        let err = engine
            .write_object(
                &mut WriteContext::new(),
                &mut Output::new(),
                &Value::Null,
                &TypeHandle::from(&point),
            )
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NullNotAllowed));
    }

    #[test]
    fn test_references_off_duplicates_shared_instances() {
        let engine = Engine::with_config(EngineConfig {
            references: false,
            ..EngineConfig::default()
        });
        let point = ClassDef::builder("Point").field("x", FieldType::Int).build();
        let pair = ClassDef::builder("Pair")
            .field("a", FieldType::class("Point"))
            .field("b", FieldType::class("Point"))
            .build();
        engine.register(&point).expect("point");
        engine.register(&pair).expect("pair");

        let shared = ObjectRef::new(&point).with("x", 5).expect("x");
        let obj = ObjectRef::new(&pair)
            .with("a", shared.clone())
            .and_then(|o| o.with("b", shared))
            .expect("pair");
        let bytes = engine.serialize(&Value::Object(obj)).expect("serialize");
        // Pair id 11, then each member as class 12 + x.
        assert_eq!(bytes, vec![13, 12, 5, 12, 5]);

        let decoded = engine.deserialize(&bytes).expect("deserialize");
        let decoded = decoded.as_object().expect("pair");
        let a = decoded.get_field("a").expect("a");
        let b = decoded.get_field("b").expect("b");
        assert_ne!(a, b);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let engine = Engine::new();
        let err = engine.deserialize(&[2, 2, 0]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidData(_)));
    }
}
