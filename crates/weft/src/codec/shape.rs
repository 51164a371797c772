// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declared-type resolution for member and element positions.
//!
//! A position's declared type decides its wire form:
//!
//! | Declared | Form |
//! |----------|------|
//! | primitive member | inline, using the member's numeric flags |
//! | `String`, list, final class, bound type variable | [`Shape::Fixed`]: no class token |
//! | `Any`, non-final class, unbound type variable | [`Shape::Dynamic`]: class-and-object |
//!
//! Each visit pushes the position's type-variable bindings (or a barrier)
//! onto the generics scope, so the nested codec resolves its own type
//! parameters and nothing else.

use crate::context::{GenericsScope, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::io::{Input, Output};
use crate::types::{Builtin, FieldDef, FieldType, TypeHandle};
use crate::value::Value;

/// Bindings a position establishes for its nested codec.
pub(crate) type Bindings = Vec<(String, FieldType)>;

#[derive(Debug, Clone)]
pub(crate) enum Shape {
    /// Concrete type known on both ends.
    Fixed { ty: TypeHandle, bindings: Bindings },
    /// Concrete type written before the value.
    Dynamic { bindings: Bindings },
}

impl Shape {
    fn bindings(&self) -> Bindings {
        match self {
            Shape::Fixed { bindings, .. } | Shape::Dynamic { bindings } => bindings.clone(),
        }
    }

    /// Same bindings, but always written with its class.
    pub(crate) fn into_dynamic(self) -> Shape {
        match self {
            Shape::Fixed { bindings, .. } => Shape::Dynamic { bindings },
            dynamic => dynamic,
        }
    }
}

/// Built-in type a declared type boxes to, if any.
pub(crate) fn builtin_of(ty: &FieldType) -> Option<Builtin> {
    let builtin = match ty {
        FieldType::Bool => Builtin::Bool,
        FieldType::Byte => Builtin::Byte,
        FieldType::Short => Builtin::Short,
        FieldType::Int => Builtin::Int,
        FieldType::Long => Builtin::Long,
        FieldType::Float => Builtin::Float,
        FieldType::Double => Builtin::Double,
        FieldType::Char => Builtin::Char,
        FieldType::Str => Builtin::Str,
        _ => return None,
    };
    Some(builtin)
}

/// Resolve the shape of a reference position declared as `declared`.
///
/// Primitives resolve to their boxed built-in; callers that write
/// primitives inline check [`FieldType::is_primitive`] first.
pub(crate) fn resolve(engine: &Engine, scope: &GenericsScope, declared: &FieldType) -> Result<Shape> {
    if let Some(builtin) = builtin_of(declared) {
        return Ok(Shape::Fixed {
            ty: TypeHandle::Builtin(builtin),
            bindings: Vec::new(),
        });
    }
    match declared {
        FieldType::Any => Ok(Shape::Dynamic {
            bindings: Vec::new(),
        }),
        FieldType::Class(name) => class_shape(engine, name, Vec::new()),
        FieldType::Parameterized(name, args) => {
            let class = engine.class(name)?;
            let bindings = class
                .type_params()
                .iter()
                .cloned()
                .zip(args.iter().map(|arg| scope.close(arg)))
                .collect();
            class_shape(engine, name, bindings)
        }
        FieldType::List(element) => Ok(Shape::Fixed {
            ty: TypeHandle::Builtin(Builtin::List),
            bindings: vec![(LIST_ELEMENT.to_owned(), scope.close(element))],
        }),
        FieldType::TypeVar(var) => match scope.resolve(var) {
            // Bindings are closed when pushed, so this does not recurse
            // into another variable.
            Some(bound) => {
                let bound = bound.clone();
                resolve(engine, scope, &bound)
            }
            None => Ok(Shape::Dynamic {
                bindings: Vec::new(),
            }),
        },
        other => Err(Error::invalid_data(format!(
            "no shape for declared type {}",
            other.describe()
        ))),
    }
}

fn class_shape(engine: &Engine, name: &str, bindings: Bindings) -> Result<Shape> {
    let class = engine.class(name)?;
    if class.is_final() {
        Ok(Shape::Fixed {
            ty: TypeHandle::Class(class),
            bindings,
        })
    } else {
        Ok(Shape::Dynamic { bindings })
    }
}

/// Type parameter name of the built-in list.
pub(crate) const LIST_ELEMENT: &str = "E";

pub(crate) fn write_value(
    engine: &Engine,
    ctx: &mut WriteContext,
    out: &mut Output,
    shape: &Shape,
    value: &Value,
    nullable: bool,
) -> Result<()> {
    let frame = ctx.generics.push(shape.bindings());
    let result = match shape {
        Shape::Fixed { ty, .. } if nullable => engine.write_object_or_null(ctx, out, value, ty),
        Shape::Fixed { ty, .. } => engine.write_object(ctx, out, value, ty),
        Shape::Dynamic { .. } => engine.write_class_and_object(ctx, out, value),
    };
    ctx.generics.pop(frame);
    result
}

pub(crate) fn read_value(
    engine: &Engine,
    ctx: &mut ReadContext,
    input: &mut Input<'_>,
    shape: &Shape,
    nullable: bool,
) -> Result<Value> {
    let frame = ctx.generics.push(shape.bindings());
    let result = match shape {
        Shape::Fixed { ty, .. } if nullable => engine.read_object_or_null(ctx, input, ty),
        Shape::Fixed { ty, .. } => engine.read_object(ctx, input, ty),
        Shape::Dynamic { .. } => engine.read_class_and_object(ctx, input),
    };
    ctx.generics.pop(frame);
    result
}

/// Write a primitive member in place.
pub(crate) fn write_inline(out: &mut Output, field: &FieldDef, value: &Value) -> Result<()> {
    match (&field.ty, value) {
        (FieldType::Bool, Value::Bool(v)) => out.write_bool(*v),
        (FieldType::Byte, Value::Byte(v)) => out.write_i8(*v),
        (FieldType::Short, Value::Short(v)) => out.write_i16(*v),
        (FieldType::Int, Value::Int(v)) if field.var_int => {
            out.write_var_int(*v, field.optimize_positive);
        }
        (FieldType::Int, Value::Int(v)) => out.write_i32(*v),
        (FieldType::Long, Value::Long(v)) if field.var_int => {
            out.write_var_long(*v, field.optimize_positive);
        }
        (FieldType::Long, Value::Long(v)) => out.write_i64(*v),
        (FieldType::Float, Value::Float(v)) => out.write_f32(*v),
        (FieldType::Double, Value::Double(v)) => out.write_f64(*v),
        (FieldType::Char, Value::Char(v)) => out.write_char(*v),
        (declared, other) => {
            return Err(Error::type_mismatch(declared.describe(), other.type_name()))
        }
    }
    Ok(())
}

pub(crate) fn read_inline(input: &mut Input<'_>, field: &FieldDef) -> Result<Value> {
    let value = match field.ty {
        FieldType::Bool => Value::Bool(input.read_bool()?),
        FieldType::Byte => Value::Byte(input.read_i8()?),
        FieldType::Short => Value::Short(input.read_i16()?),
        FieldType::Int if field.var_int => Value::Int(input.read_var_int(field.optimize_positive)?),
        FieldType::Int => Value::Int(input.read_i32()?),
        FieldType::Long if field.var_int => {
            Value::Long(input.read_var_long(field.optimize_positive)?)
        }
        FieldType::Long => Value::Long(input.read_i64()?),
        FieldType::Float => Value::Float(input.read_f32()?),
        FieldType::Double => Value::Double(input.read_f64()?),
        FieldType::Char => Value::Char(input.read_char()?),
        ref other => {
            return Err(Error::invalid_data(format!(
                "{} is not a primitive member type",
                other.describe()
            )))
        }
    };
    Ok(value)
}
