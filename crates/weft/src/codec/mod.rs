// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec interface and the built-in codecs.
//!
//! A codec reads and writes the body of one type (or type family). Class
//! tokens, reference markers and presence bytes are written by the
//! [`Engine`]; codecs recurse into nested values through the engine so
//! those concerns stay in one place.

mod deflate;
mod leaf;
mod list;
mod shape;
pub mod structure;

pub use deflate::DeflateCodec;
pub use leaf::{
    BoolCodec, ByteCodec, CharCodec, DoubleCodec, FloatCodec, IntCodec, LongCodec, ShortCodec,
    StringCodec,
};
pub use list::ListCodec;
pub use structure::{CompatibleFieldCodec, FieldCodec, TaggedFieldCodec, VersionFieldCodec};

use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::engine::Engine;
use crate::error::{ErrorKind, Result};
use crate::io::{Input, Output};
use crate::types::{Builtin, TypeHandle};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Read/write/copy implementation for one type or type family.
pub trait Codec: Send + Sync + fmt::Debug {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    fn write(
        &self,
        engine: &Engine,
        ctx: &mut WriteContext,
        out: &mut Output,
        value: &Value,
    ) -> Result<()>;

    /// Read one value of concrete type `ty`.
    fn read(
        &self,
        engine: &Engine,
        ctx: &mut ReadContext,
        input: &mut Input<'_>,
        ty: &TypeHandle,
    ) -> Result<Value>;

    /// Deep-copy `value`. Immutable codecs return it unchanged.
    fn copy(&self, engine: &Engine, ctx: &mut CopyContext, value: &Value) -> Result<Value> {
        let _ = (engine, ctx);
        if self.is_immutable() {
            return Ok(value.clone());
        }
        Err(ErrorKind::UnsupportedType {
            codec: self.name(),
            ty: format!("copy of {}", value.type_name()),
        }
        .into())
    }

    /// Has its own encoding for null, so no presence byte is needed.
    fn accepts_null(&self) -> bool {
        false
    }

    /// Copies may share the original value.
    fn is_immutable(&self) -> bool {
        false
    }

    /// Every value occupies the same number of bytes.
    fn is_fixed_size(&self) -> bool {
        false
    }

    /// Never recurses into the engine. Leaf bodies do not count toward
    /// `max_depth`.
    fn is_leaf(&self) -> bool {
        false
    }

    /// Allocates instances through the registration's instantiator, so the
    /// instantiator must be able to construct the type.
    fn instantiates(&self) -> bool {
        false
    }
}

/// Builds a codec for a type that has no explicit one.
pub trait CodecFactory: Send + Sync {
    fn create(&self, engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>>;
}

impl<F> CodecFactory for F
where
    F: Fn(&Engine, &TypeHandle) -> Result<Arc<dyn Codec>> + Send + Sync,
{
    fn create(&self, engine: &Engine, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
        self(engine, ty)
    }
}

/// Codec for a built-in type.
pub fn builtin_codec(builtin: Builtin) -> Arc<dyn Codec> {
    match builtin {
        Builtin::Int => Arc::new(IntCodec),
        Builtin::Str => Arc::new(StringCodec),
        Builtin::Float => Arc::new(FloatCodec),
        Builtin::Bool => Arc::new(BoolCodec),
        Builtin::Byte => Arc::new(ByteCodec),
        Builtin::Char => Arc::new(CharCodec),
        Builtin::Short => Arc::new(ShortCodec),
        Builtin::Long => Arc::new(LongCodec),
        Builtin::Double => Arc::new(DoubleCodec),
        Builtin::List => Arc::new(ListCodec),
    }
}
