// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The serialization engine: registry, codec selection and graph dispatch.
//!
//! An [`Engine`] holds only configuration-time state (registrations, class
//! catalog, cached member layouts). Every top-level call creates its own
//! [`WriteContext`], [`ReadContext`] or [`CopyContext`], so one engine can
//! be shared across threads.
//!
//! ```text
//! serialize(value)
//!   v write_root: class token [+ silent ordinal 1] + body
//!   v codec.write(...)
//!       v member values -> write_object / write_class_and_object
//!           v marker | class token | body (recursively)
//! ```

mod builder;
mod dispatch;

pub use builder::{EngineBuilder, Registrar};

use crate::codec::{builtin_codec, Codec, CodecFactory};
use crate::config::EngineConfig;
use crate::context::{CopyContext, ReadContext, WriteContext};
use crate::error::{ErrorKind, Result};
use crate::io::{Input, Output};
use crate::registry::{DefaultRule, Registration, Registry};
use crate::strategy::{Instantiator, ReferencePolicy};
use crate::types::{discover_members, Builtin, ClassDef, Member, TypeHandle};
use crate::value::{ObjectRef, Value};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Object-graph serializer.
pub struct Engine {
    config: EngineConfig,
    registry: Registry,
    rules: Vec<DefaultRule>,
    fallback: Arc<dyn CodecFactory>,
    instantiator: Arc<dyn Instantiator>,
    reference_policy: Arc<dyn ReferencePolicy>,
    members: DashMap<String, Arc<[Member]>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registrations", &self.registry.registrations().len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine with the default configuration and the built-in types
    /// registered.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===== Class catalog =====

    /// Make `class` (and its ancestors) known for member type resolution
    /// and by-name class tokens, without registering it.
    pub fn define(&self, class: &Arc<ClassDef>) {
        self.registry.define(class);
    }

    /// Look up a defined class.
    pub fn class(&self, name: &str) -> Result<Arc<ClassDef>> {
        self.registry
            .class(name)
            .ok_or_else(|| ErrorKind::UnknownClass(name.to_owned()).into())
    }

    /// Serializable members of `class`, discovered once and cached.
    pub fn members(&self, class: &ClassDef) -> Arc<[Member]> {
        if let Some(cached) = self.members.get(class.name()) {
            return Arc::clone(cached.value());
        }
        let discovered: Arc<[Member]> =
            discover_members(class, self.config.field.serialize_transient).into();
        let entry = self
            .members
            .entry(class.name().to_owned())
            .or_insert(discovered);
        Arc::clone(entry.value())
    }

    // ===== Registration =====

    /// Start a registration for `ty` with optional id, codec and
    /// instantiator.
    pub fn registrar(&self, ty: impl Into<TypeHandle>) -> Registrar<'_> {
        Registrar::new(self, ty.into())
    }

    /// Register `ty` under the next free id with its default codec.
    pub fn register(&self, ty: impl Into<TypeHandle>) -> Result<Arc<Registration>> {
        self.registrar(ty).register()
    }

    pub fn register_with_id(&self, ty: impl Into<TypeHandle>, id: u32) -> Result<Arc<Registration>> {
        self.registrar(ty).id(id).register()
    }

    /// Existing registration of `ty`, without implicit registration.
    pub fn registration(&self, ty: &TypeHandle) -> Option<Arc<Registration>> {
        self.registry.get(ty.name())
    }

    pub fn registration_by_id(&self, id: u32) -> Option<Arc<Registration>> {
        self.registry.get_by_id(id)
    }

    /// All registrations with an id, ordered by id.
    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        self.registry.registrations()
    }

    /// Registration of `ty`, registering it by name on first use unless
    /// registration is required.
    pub fn registration_for(&self, ty: &TypeHandle) -> Result<Arc<Registration>> {
        if let Some(registration) = self.registry.get(ty.name()) {
            return Ok(registration);
        }
        if self.config.registration_required {
            return Err(ErrorKind::Unregistered(ty.name().to_owned()).into());
        }
        if let Some(class) = ty.as_class() {
            self.define(class);
        }
        let codec = self.default_codec(ty)?;
        self.check_instantiable(ty, codec.as_ref(), self.instantiator.as_ref())?;
        log::debug!(
            "[registry] implicit registration of {} (written by name)",
            ty.name()
        );
        Ok(self
            .registry
            .register_implicit(ty.clone(), codec, Arc::clone(&self.instantiator)))
    }

    /// Codec registered for `ty`.
    pub fn codec_for(&self, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
        Ok(self.registration_for(ty)?.codec())
    }

    /// Codec `ty` gets when registered without one: an exact default-codec
    /// rule, else the first rule whose type `ty` is assignable to, else the
    /// built-in codec, else the configured structural codec.
    pub fn default_codec(&self, ty: &TypeHandle) -> Result<Arc<dyn Codec>> {
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.ty == *ty)
            .or_else(|| self.rules.iter().find(|rule| ty.is_assignable_to(&rule.ty)));
        if let Some(rule) = rule {
            return rule.factory.create(self, ty);
        }
        if let TypeHandle::Builtin(builtin) = ty {
            return Ok(builtin_codec(*builtin));
        }
        self.fallback.create(self, ty)
    }

    fn check_instantiable(
        &self,
        ty: &TypeHandle,
        codec: &dyn Codec,
        instantiator: &dyn Instantiator,
    ) -> Result<()> {
        if !codec.instantiates() {
            return Ok(());
        }
        match ty.as_class() {
            Some(class) if !instantiator.can_instantiate(class) => {
                Err(ErrorKind::NotInstantiable(class.name().to_owned()).into())
            }
            _ => Ok(()),
        }
    }

    /// Allocate an instance of `class` through its registration's
    /// instantiator.
    pub fn new_instance(&self, class: &Arc<ClassDef>) -> Result<ObjectRef> {
        let registration = self.registration_for(&TypeHandle::from(class))?;
        registration.instantiator().new_instance(class)
    }

    /// Whether values of `ty` get reference markers.
    pub fn use_references(&self, ty: &TypeHandle) -> bool {
        self.config.references && ty.has_identity() && self.reference_policy.use_references(ty)
    }

    // ===== Top-level calls =====

    /// Serialize a graph rooted at `value`, class token first.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Output::with_capacity(64);
        self.write_root(&mut WriteContext::new(), &mut out, value)?;
        Ok(out.into_bytes())
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<Value> {
        let mut input = Input::new(bytes);
        let value = self.read_root(&mut ReadContext::new(), &mut input)?;
        Self::expect_consumed(&input)?;
        Ok(value)
    }

    /// Serialize `value` as type `ty` known to both ends; no root class
    /// token is written.
    pub fn serialize_as(&self, value: &Value, ty: &TypeHandle) -> Result<Vec<u8>> {
        let mut out = Output::with_capacity(64);
        self.write_root_as(&mut WriteContext::new(), &mut out, value, ty)?;
        Ok(out.into_bytes())
    }

    pub fn deserialize_as(&self, bytes: &[u8], ty: &TypeHandle) -> Result<Value> {
        let mut input = Input::new(bytes);
        let value = self.read_root_as(&mut ReadContext::new(), &mut input, ty)?;
        Self::expect_consumed(&input)?;
        Ok(value)
    }

    /// Deep-copy a graph, preserving shared and cyclic references.
    pub fn copy(&self, value: &Value) -> Result<Value> {
        self.copy_value(&mut CopyContext::new(), value)
    }

    fn expect_consumed(input: &Input<'_>) -> Result<()> {
        if input.is_eof() {
            return Ok(());
        }
        Err(crate::error::Error::invalid_data(format!(
            "{} trailing bytes after root value",
            input.remaining()
        )))
    }

    /// Register the built-in types in their fixed id order.
    fn register_builtins(&self) {
        for (id, builtin) in Builtin::ALL.into_iter().enumerate() {
            self.registry.seed(
                TypeHandle::Builtin(builtin),
                id as u32,
                builtin_codec(builtin),
                Arc::clone(&self.instantiator),
            );
        }
    }
}
