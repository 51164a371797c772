// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in ordered list.
//!
//! Wire form: `varint(len)` then each element. The element type comes from
//! the `E` binding of the enclosing member (`List<Point>` members write
//! elements without a class token when `Point` is final); without a
//! binding every element carries its class.

use super::shape::{self, Shape, LIST_ELEMENT};
use super::Codec;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::io::{Input, Output};
use crate::types::{FieldType, TypeHandle};
use crate::value::{ListRef, Value};

#[derive(Debug, Default, Clone, Copy)]
pub struct ListCodec;

impl ListCodec {
    fn element_shape(engine: &Engine, scope: &crate::context::GenericsScope) -> Result<Shape> {
        let declared = scope
            .resolve(LIST_ELEMENT)
            .cloned()
            .unwrap_or(FieldType::Any);
        shape::resolve(engine, scope, &declared)
    }
}

impl Codec for ListCodec {
    fn name(&self) -> &'static str {
        "ListCodec"
    }

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()> {
        let list = value
            .as_list()
            .ok_or_else(|| Error::type_mismatch("List", value.type_name()))?;
        let element = Self::element_shape(engine, &ctx.generics)?;
        let items = list.items();
        out.write_var_u32(items.len() as u32);
        for (index, item) in items.iter().enumerate() {
            shape::write_value(engine, ctx, out, &element, item, true)
                .map_err(|e| e.with_trace(format!("[{}] (List)", index)))?;
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
        let len = input.read_var_u32()? as usize;
        // Every element needs at least one byte.
        if len > input.remaining() {
            return Err(Error::invalid_data(format!(
                "list length {} exceeds remaining {} bytes",
                len,
                input.remaining()
            )));
        }
        let list = ListRef::new();
        ctx.reference(Value::List(list.clone()));
        let element = Self::element_shape(engine, &ctx.generics)?;
        for index in 0..len {
            let item = shape::read_value(engine, ctx, input, &element, true)
                .map_err(|e| e.with_trace(format!("[{}] (List)", index)))?;
            list.push(item);
        }
        Ok(Value::List(list))
    }

    fn copy(&self, engine: &Engine, ctx: &mut CopyContext, value: &Value) -> Result<Value> {
        let original = value
            .as_list()
            .ok_or_else(|| Error::type_mismatch("List", value.type_name()))?;
        let copy = ListRef::new();
        ctx.reference(value, &Value::List(copy.clone()));
        for item in original.items() {
            copy.push(engine.copy_value(ctx, &item)?);
        }
        Ok(Value::List(copy))
    }
}
