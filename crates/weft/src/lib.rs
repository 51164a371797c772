// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # weft - compact binary object-graph serialization
//!
//! Serializes graphs of class instances (with shared members and cycles)
//! into a compact binary stream and back, driven by runtime class
//! definitions instead of generated code.
//!
//! ## Quick Start
//!
//! ```rust
//! use weft::{ClassDef, Engine, FieldType, ObjectRef, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let point = ClassDef::builder("Point")
//!         .field("x", FieldType::Int)
//!         .field("y", FieldType::Int)
//!         .build();
//!
//!     let engine = Engine::new();
//!     engine.register_with_id(&point, 10)?;
//!
//!     let value = Value::from(ObjectRef::new(&point).with("x", 1)?.with("y", 2)?);
//!     let bytes = engine.serialize(&value)?;
//!     assert_eq!(bytes, vec![12, 1, 2]);
//!
//!     let decoded = engine.deserialize(&bytes)?;
//!     assert!(weft::graph_eq(&decoded, &value));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  Engine: registry, codec selection, markers, class tokens     |
//! +---------------------------------------------------------------+
//! |  Codecs: leaf | list | deflate | structural (4 variants)      |
//! +---------------------------------------------------------------+
//! |  Contexts: reference table, generics scope, schema flags      |
//! +---------------------------------------------------------------+
//! |  io: varints, strings, big-endian fixed width, chunk framing  |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Engine`] | Registry and dispatch; shareable across threads |
//! | [`ClassDef`] | Runtime class definition (members, ancestry, type params) |
//! | [`Value`] | Dynamic graph node; instances are shared handles |
//! | [`Codec`] | Body encoding of one type family |
//! | [`EngineConfig`] | References, closed registry, depth limit, codec settings |
//!
//! ## Structural codecs
//!
//! - [`FieldCodec`] - members in alphabetical order, nothing else
//! - [`CompatibleFieldCodec`] - member names once per stream, chunked values
//! - [`TaggedFieldCodec`] - tagged members only, tag before each value
//! - [`VersionFieldCodec`] - one version number, members gated by `since`

pub mod codec;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod io;
pub mod registry;
pub mod strategy;
pub mod types;
pub mod value;

pub use codec::{
    BoolCodec, ByteCodec, CharCodec, Codec, CodecFactory, CompatibleFieldCodec, DeflateCodec,
    DoubleCodec, FieldCodec, FloatCodec, IntCodec, ListCodec, LongCodec, ShortCodec, StringCodec,
    TaggedFieldCodec, VersionFieldCodec,
};
pub use config::{
    CompatibleConfig, EngineConfig, FieldConfig, StructureKind, TaggedConfig, VersionConfig,
};
pub use context::{CopyContext, GenericsScope, ReadContext, WriteContext};
pub use engine::{Engine, EngineBuilder, Registrar};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use io::{Input, Output};
pub use registry::Registration;
pub use strategy::{
    BypassInstantiator, Instantiator, ReferencePolicy, StrictInstantiator, TrackIdentity,
};
pub use types::{Builtin, ClassBuilder, ClassDef, FieldDef, FieldType, Member, TypeHandle};
pub use value::{graph_eq, ListRef, ObjectRef, Value};
