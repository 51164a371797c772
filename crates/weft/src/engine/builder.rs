// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine construction and type registration builders.

use super::Engine;
use crate::codec::{structure, Codec, CodecFactory};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::registry::{DefaultRule, Registration, Registry};
use crate::strategy::{Instantiator, ReferencePolicy, StrictInstantiator, TrackIdentity};
use crate::types::TypeHandle;
use dashmap::DashMap;
use std::sync::Arc;

/// Builder for configuring and creating an [`Engine`].
///
/// ```
/// use weft::{Engine, EngineConfig, BypassInstantiator};
/// use std::sync::Arc;
///
/// let engine = Engine::builder()
///     .config(EngineConfig { references: false, ..EngineConfig::default() })
///     .instantiator(Arc::new(BypassInstantiator))
///     .build();
/// assert!(!engine.config().references);
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    instantiator: Option<Arc<dyn Instantiator>>,
    reference_policy: Option<Arc<dyn ReferencePolicy>>,
    rules: Vec<DefaultRule>,
    fallback: Option<Arc<dyn CodecFactory>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Instantiator for registrations that do not name their own
    /// (default: [`StrictInstantiator`]).
    pub fn instantiator(mut self, instantiator: Arc<dyn Instantiator>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    /// Which identity-bearing types are reference tracked
    /// (default: all of them).
    pub fn reference_policy(mut self, policy: Arc<dyn ReferencePolicy>) -> Self {
        self.reference_policy = Some(policy);
        self
    }

    /// Codec factory for `ty` and every type assignable to it. Rules are
    /// consulted in the order they were added.
    pub fn default_codec(
        mut self,
        ty: impl Into<TypeHandle>,
        factory: Arc<dyn CodecFactory>,
    ) -> Self {
        self.rules.push(DefaultRule {
            ty: ty.into(),
            factory,
        });
        self
    }

    /// Codec factory for classes no rule matches (default: the structural
    /// codec named by `default_structure`).
    pub fn fallback_codec(mut self, factory: Arc<dyn CodecFactory>) -> Self {
        self.fallback = Some(factory);
        self
    }

    pub fn build(self) -> Engine {
        let fallback = self
            .fallback
            .unwrap_or_else(|| structure::factory(self.config.default_structure));
        log::debug!(
            "[engine] building (references={}, registration_required={}, structure={:?}, {} default-codec rules)",
            self.config.references,
            self.config.registration_required,
            self.config.default_structure,
            self.rules.len()
        );
        let engine = Engine {
            config: self.config,
            registry: Registry::new(),
            rules: self.rules,
            fallback,
            instantiator: self
                .instantiator
                .unwrap_or_else(|| Arc::new(StrictInstantiator)),
            reference_policy: self
                .reference_policy
                .unwrap_or_else(|| Arc::new(TrackIdentity)),
            members: DashMap::new(),
        };
        engine.register_builtins();
        engine
    }
}

/// Registration of one type, created by [`Engine::registrar`].
///
/// Registering a type again with the same (or no) id replaces its codec in
/// place; a different id moves the registration. An id already held by
/// another type is an [`IdConflict`](crate::ErrorKind::IdConflict).
#[must_use = "call register() to apply the registration"]
pub struct Registrar<'a> {
    engine: &'a Engine,
    ty: TypeHandle,
    id: Option<u32>,
    codec: Option<Arc<dyn Codec>>,
    instantiator: Option<Arc<dyn Instantiator>>,
}

impl<'a> Registrar<'a> {
    pub(super) fn new(engine: &'a Engine, ty: TypeHandle) -> Self {
        Self {
            engine,
            ty,
            id: None,
            codec: None,
            instantiator: None,
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn instantiator(mut self, instantiator: Arc<dyn Instantiator>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    pub fn register(self) -> Result<Arc<Registration>> {
        let engine = self.engine;
        if let Some(class) = self.ty.as_class() {
            engine.define(class);
        }

        let existing = engine.registry.get(self.ty.name());
        if let Some(existing) = &existing {
            let same_id = self.id.is_none() || self.id == existing.id();
            if same_id && existing.id().is_some() && self.instantiator.is_none() {
                if let Some(codec) = self.codec {
                    engine.check_instantiable(
                        &self.ty,
                        codec.as_ref(),
                        existing.instantiator().as_ref(),
                    )?;
                    log::debug!(
                        "[registry] {} codec {} -> {}",
                        self.ty,
                        existing.codec().name(),
                        codec.name()
                    );
                    existing.swap_codec(codec);
                }
                return Ok(Arc::clone(existing));
            }
        }

        let codec = match (self.codec, &existing) {
            (Some(codec), _) => codec,
            (None, Some(existing)) => existing.codec(),
            (None, None) => engine.default_codec(&self.ty)?,
        };
        let instantiator = self
            .instantiator
            .or_else(|| existing.as_ref().map(|e| Arc::clone(e.instantiator())))
            .unwrap_or_else(|| Arc::clone(&engine.instantiator));
        engine.check_instantiable(&self.ty, codec.as_ref(), instantiator.as_ref())?;

        let id = self.id.or_else(|| existing.as_ref().and_then(|e| e.id()));
        let codec_name = codec.name();
        let registration = engine
            .registry
            .register(self.ty, id, true, codec, instantiator)?;
        log::debug!(
            "[registry] {} registered as id {:?} ({})",
            registration.ty(),
            registration.id(),
            codec_name
        );
        Ok(registration)
    }
}
