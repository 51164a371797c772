// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable strategies: object construction and reference tracking.

use crate::error::{ErrorKind, Result};
use crate::types::{ClassDef, TypeHandle};
use crate::value::ObjectRef;
use std::fmt;
use std::sync::Arc;

/// Allocates instances for codecs that build objects while reading or
/// copying.
pub trait Instantiator: Send + Sync + fmt::Debug {
    fn can_instantiate(&self, class: &ClassDef) -> bool;

    fn new_instance(&self, class: &Arc<ClassDef>) -> Result<ObjectRef>;
}

/// Only constructs classes that have a no-argument constructor.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictInstantiator;

impl Instantiator for StrictInstantiator {
    fn can_instantiate(&self, class: &ClassDef) -> bool {
        class.is_instantiable()
    }

    fn new_instance(&self, class: &Arc<ClassDef>) -> Result<ObjectRef> {
        if !class.is_instantiable() {
            return Err(ErrorKind::NotInstantiable(class.name().to_owned()).into());
        }
        Ok(ObjectRef::new(class))
    }
}

/// Allocates any class with default member values, without running a
/// constructor.
#[derive(Debug, Default, Clone, Copy)]
pub struct BypassInstantiator;

impl Instantiator for BypassInstantiator {
    fn can_instantiate(&self, _class: &ClassDef) -> bool {
        true
    }

    fn new_instance(&self, class: &Arc<ClassDef>) -> Result<ObjectRef> {
        Ok(ObjectRef::new(class))
    }
}

/// Decides which identity-bearing types get reference tracking.
///
/// Leaf values never have identity and are never tracked, whatever the
/// policy says.
pub trait ReferencePolicy: Send + Sync {
    fn use_references(&self, ty: &TypeHandle) -> bool;
}

/// Track every type that has identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackIdentity;

impl ReferencePolicy for TrackIdentity {
    fn use_references(&self, _ty: &TypeHandle) -> bool {
        true
    }
}

impl<F> ReferencePolicy for F
where
    F: Fn(&TypeHandle) -> bool + Send + Sync,
{
    fn use_references(&self, ty: &TypeHandle) -> bool {
        self(ty)
    }
}
