// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for ClassDef.

use super::{ClassDef, FieldDef, FieldType};
use std::sync::Arc;

/// Builder for creating ClassDef instances.
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    parent: Option<Arc<ClassDef>>,
    type_params: Vec<String>,
    fields: Vec<FieldDef>,
    is_final: bool,
    instantiable: bool,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            type_params: Vec::new(),
            fields: Vec::new(),
            is_final: false,
            instantiable: true,
        }
    }

    pub fn extends(mut self, parent: &Arc<ClassDef>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare a type parameter, in order.
    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    /// Add a member with default flags.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Add a fully configured member.
    pub fn member(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a member carrying a wire tag.
    pub fn tagged(self, name: impl Into<String>, ty: FieldType, tag: u32) -> Self {
        self.member(FieldDef::new(name, ty).with_tag(tag))
    }

    /// Add a member introduced in type version `since`.
    pub fn versioned(self, name: impl Into<String>, ty: FieldType, since: u32) -> Self {
        self.member(FieldDef::new(name, ty).since(since))
    }

    /// No subclasses exist; members of this type omit the class token.
    pub fn final_class(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// No usable no-argument constructor (abstract types, types that need
    /// constructor arguments).
    pub fn no_default_constructor(mut self) -> Self {
        self.instantiable = false;
        self
    }

    pub fn build(self) -> Arc<ClassDef> {
        let slot_base = self.parent.as_ref().map_or(0, |p| p.slot_count());
        Arc::new(ClassDef {
            name: self.name,
            parent: self.parent,
            type_params: self.type_params,
            fields: self.fields,
            is_final: self.is_final,
            instantiable: self.instantiable,
            slot_base,
        })
    }
}
