// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: registrations by name and id, plus the class catalog.
//!
//! # Performance
//!
//! - Registrations sit behind a `parking_lot::RwLock`; steady-state
//!   lookups only take the read side
//! - The class catalog is a `DashMap`, so member-type resolution during
//!   encoding never touches the registration lock
//! - A registration's codec lives in an `ArcSwap` and can be replaced
//!   without invalidating handles already given out

use crate::codec::{Codec, CodecFactory};
use crate::error::{ErrorKind, Result};
use crate::strategy::Instantiator;
use crate::types::{ClassDef, TypeHandle};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Binding of a type to its wire id, codec and instantiator.
pub struct Registration {
    ty: TypeHandle,
    id: Option<u32>,
    codec: ArcSwap<Arc<dyn Codec>>,
    instantiator: Arc<dyn Instantiator>,
}

impl Registration {
    pub fn new(
        ty: TypeHandle,
        id: Option<u32>,
        codec: Arc<dyn Codec>,
        instantiator: Arc<dyn Instantiator>,
    ) -> Self {
        Self {
            ty,
            id,
            codec: ArcSwap::from_pointee(codec),
            instantiator,
        }
    }

    pub fn ty(&self) -> &TypeHandle {
        &self.ty
    }

    /// Wire id; `None` for classes written by name.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn codec(&self) -> Arc<dyn Codec> {
        let current = self.codec.load();
        Arc::clone(&**current)
    }

    pub(crate) fn swap_codec(&self, codec: Arc<dyn Codec>) {
        self.codec.store(Arc::new(codec));
    }

    pub fn instantiator(&self) -> &Arc<dyn Instantiator> {
        &self.instantiator
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("ty", &self.ty.name())
            .field("id", &self.id)
            .field("codec", &self.codec().name())
            .finish()
    }
}

/// A default-codec rule: types equal to or assignable to `ty` get a codec
/// from `factory`.
#[derive(Clone)]
pub(crate) struct DefaultRule {
    pub ty: TypeHandle,
    pub factory: Arc<dyn CodecFactory>,
}

#[derive(Default)]
struct Tables {
    by_name: HashMap<String, Arc<Registration>>,
    by_id: HashMap<u32, Arc<Registration>>,
    next_id: u32,
}

impl Tables {
    fn next_free_id(&mut self) -> u32 {
        while self.by_id.contains_key(&self.next_id) {
            self.next_id += 1;
        }
        self.next_id
    }

    fn check_id(&self, id: u32, ty: &TypeHandle) -> Result<()> {
        match self.by_id.get(&id) {
            Some(existing) if existing.ty() != ty => Err(ErrorKind::IdConflict {
                id,
                existing: existing.ty().name().to_owned(),
                requested: ty.name().to_owned(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn insert(&mut self, registration: Arc<Registration>) {
        let name = registration.ty().name().to_owned();
        if let Some(previous) = self.by_name.insert(name, Arc::clone(&registration)) {
            if let Some(old_id) = previous.id() {
                if previous.id() != registration.id() {
                    self.by_id.remove(&old_id);
                }
            }
        }
        if let Some(id) = registration.id() {
            self.by_id.insert(id, registration);
        }
    }
}

pub(crate) struct Registry {
    tables: RwLock<Tables>,
    catalog: DashMap<String, Arc<ClassDef>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            catalog: DashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Registration>> {
        self.tables.read().by_name.get(name).cloned()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Arc<Registration>> {
        self.tables.read().by_id.get(&id).cloned()
    }

    /// Insert a registration under `id`, or under the next free id when
    /// `id` is `None` and `assign_id` is set.
    pub fn register(
        &self,
        ty: TypeHandle,
        id: Option<u32>,
        assign_id: bool,
        codec: Arc<dyn Codec>,
        instantiator: Arc<dyn Instantiator>,
    ) -> Result<Arc<Registration>> {
        let mut tables = self.tables.write();
        let id = match id {
            Some(id) => {
                tables.check_id(id, &ty)?;
                Some(id)
            }
            None if assign_id => Some(tables.next_free_id()),
            None => None,
        };
        let registration = Arc::new(Registration::new(ty, id, codec, instantiator));
        tables.insert(Arc::clone(&registration));
        Ok(registration)
    }

    /// Insert a registration into a table known not to hold `id`.
    pub fn seed(
        &self,
        ty: TypeHandle,
        id: u32,
        codec: Arc<dyn Codec>,
        instantiator: Arc<dyn Instantiator>,
    ) {
        let registration = Registration::new(ty, Some(id), codec, instantiator);
        self.tables.write().insert(Arc::new(registration));
    }

    /// Insert a by-name registration unless another caller won the race.
    pub fn register_implicit(
        &self,
        ty: TypeHandle,
        codec: Arc<dyn Codec>,
        instantiator: Arc<dyn Instantiator>,
    ) -> Arc<Registration> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.by_name.get(ty.name()) {
            return Arc::clone(existing);
        }
        let registration = Arc::new(Registration::new(ty, None, codec, instantiator));
        tables.insert(Arc::clone(&registration));
        registration
    }

    /// All registrations with an id, ordered by id.
    pub fn registrations(&self) -> Vec<Arc<Registration>> {
        let tables = self.tables.read();
        let mut out: Vec<Arc<Registration>> = tables.by_id.values().cloned().collect();
        out.sort_by_key(|r| r.id());
        out
    }

    /// Add `class` and its ancestors to the catalog.
    pub fn define(&self, class: &Arc<ClassDef>) {
        let mut current = Some(Arc::clone(class));
        while let Some(class) = current {
            current = class.parent().cloned();
            self.catalog
                .entry(class.name().to_owned())
                .or_insert(class);
        }
    }

    pub fn class(&self, name: &str) -> Option<Arc<ClassDef>> {
        self.catalog.get(name).map(|entry| Arc::clone(entry.value()))
    }
}
