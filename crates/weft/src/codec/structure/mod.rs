// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural codecs: class instances written member by member.
//!
//! | Codec | Schema on wire | Member added | Member removed | Renamed/reordered |
//! |-------|----------------|--------------|----------------|-------------------|
//! | [`FieldCodec`] | none | breaks | breaks | breaks |
//! | [`CompatibleFieldCodec`] | names once per stream | ignored | skipped | matched by name |
//! | [`TaggedFieldCodec`] | tag per member | skipped or rejected | not written | tolerated |
//! | [`VersionFieldCodec`] | one version number | gated by `since` | no | no |
//!
//! All four share member discovery (alphabetical, ancestors included,
//! static and transient members excluded) and read by allocating the
//! instance, binding it to its reference ordinal, then filling members.

mod compatible;
mod field;
mod tagged;
mod versioned;

pub use compatible::CompatibleFieldCodec;
pub use field::FieldCodec;
pub use tagged::TaggedFieldCodec;
pub use versioned::VersionFieldCodec;

use super::shape::{self, Shape};
use super::{Codec, CodecFactory};
use crate::config::StructureKind;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, ErrorKind, Result};
use crate::io::{Input, Output};
use crate::types::{ClassDef, Member, TypeHandle};
use crate::value::{ObjectRef, Value};
use std::sync::Arc;

/// Factory building the structural codec of `kind` for any class.
pub fn factory(kind: StructureKind) -> Arc<dyn CodecFactory> {
    match kind {
        StructureKind::FieldOrder => Arc::new(field_order),
        StructureKind::NamedSchema => Arc::new(named_schema),
        StructureKind::Tagged => Arc::new(tagged),
        StructureKind::Versioned => Arc::new(versioned),
    }
}

fn field_order(engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
    let class = class_of("FieldCodec", ty)?;
    Ok(Arc::new(FieldCodec::new(engine, &class)))
}

fn named_schema(engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
    let class = class_of("CompatibleFieldCodec", ty)?;
    Ok(Arc::new(CompatibleFieldCodec::new(engine, &class)))
}

fn tagged(engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
    let class = class_of("TaggedFieldCodec", ty)?;
    Ok(Arc::new(TaggedFieldCodec::new(engine, &class)?))
}

fn versioned(engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
    let class = class_of("VersionFieldCodec", ty)?;
    Ok(Arc::new(VersionFieldCodec::new(engine, &class)))
}

fn class_of(codec: &'static str, ty: &TypeHandle) -> Result<Arc<ClassDef>> {
    ty.as_class().cloned().ok_or_else(|| {
        ErrorKind::UnsupportedType {
            codec,
            ty: ty.name().to_owned(),
        }
        .into()
    })
}

/// The instance behind `value`, which must be of exactly `class`.
fn expect_object<'a>(class: &ClassDef, value: &'a Value) -> Result<&'a ObjectRef> {
    match value {
        Value::Object(obj) if obj.class().name() == class.name() => Ok(obj),
        other => Err(Error::type_mismatch(class.name(), other.type_name())),
    }
}

fn is_nullable(engine: &Engine, member: &Member) -> bool {
    member
        .field
        .nullable
        .unwrap_or(engine.config().field.fields_can_be_null)
}

/// Write one member value by its declared type.
fn write_member(
    engine: &Engine,
    ctx: &mut WriteContext,
    out: &mut Output,
    member: &Member,
    value: &Value,
) -> Result<()> {
    if member.field.ty.is_primitive() {
        return shape::write_inline(out, &member.field, value);
    }
    let shape = shape::resolve(engine, &ctx.generics, &member.field.ty)?;
    shape::write_value(engine, ctx, out, &shape, value, is_nullable(engine, member))
}

fn read_member(
    engine: &Engine,
    ctx: &mut ReadContext,
    input: &mut Input<'_>,
    member: &Member,
) -> Result<Value> {
    if member.field.ty.is_primitive() {
        return shape::read_inline(input, &member.field);
    }
    let shape = shape::resolve(engine, &ctx.generics, &member.field.ty)?;
    shape::read_value(engine, ctx, input, &shape, is_nullable(engine, member))
}

/// Write one member with its concrete class, whatever its declared type.
fn write_member_with_class(
    engine: &Engine,
    ctx: &mut WriteContext,
    out: &mut Output,
    member: &Member,
    value: &Value,
) -> Result<()> {
    let shape = dynamic_shape(engine, &ctx.generics, member)?;
    shape::write_value(engine, ctx, out, &shape, value, true)
}

fn read_member_with_class(
    engine: &Engine,
    ctx: &mut ReadContext,
    input: &mut Input<'_>,
    member: &Member,
) -> Result<Value> {
    let shape = dynamic_shape(engine, &ctx.generics, member)?;
    let value = shape::read_value(engine, ctx, input, &shape, true)?;
    if member.field.ty.is_primitive() {
        let expected = shape::builtin_of(&member.field.ty).map(TypeHandle::Builtin);
        if value.type_handle() != expected {
            return Err(Error::type_mismatch(
                member.field.ty.describe(),
                value.type_name(),
            ));
        }
    }
    Ok(value)
}

fn dynamic_shape(
    engine: &Engine,
    scope: &crate::context::GenericsScope,
    member: &Member,
) -> Result<Shape> {
    if member.field.ty.is_primitive() {
        return Ok(Shape::Dynamic {
            bindings: Vec::new(),
        });
    }
    Ok(shape::resolve(engine, scope, &member.field.ty)?.into_dynamic())
}

/// Allocate an instance for reading and bind it to its reference ordinal.
fn instantiate(engine: &Engine, ctx: &mut ReadContext, class: &Arc<ClassDef>) -> Result<ObjectRef> {
    let obj = engine.new_instance(class)?;
    ctx.reference(Value::Object(obj.clone()));
    Ok(obj)
}

/// Deep-copy the listed members of an instance of `class`.
fn copy_members(
    engine: &Engine,
    ctx: &mut CopyContext,
    class: &Arc<ClassDef>,
    members: &[Member],
    value: &Value,
) -> Result<Value> {
    let original = expect_object(class, value)?;
    let copy = engine.new_instance(class)?;
    ctx.reference(value, &Value::Object(copy.clone()));
    for member in members {
        let member_copy = engine
            .copy_value(ctx, &original.get(member.slot))
            .map_err(|e| e.with_trace(member.trace_entry()))?;
        copy.set(member.slot, member_copy);
    }
    Ok(Value::Object(copy))
}
