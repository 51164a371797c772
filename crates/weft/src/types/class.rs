// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Class and member definitions.

use super::ClassBuilder;
use std::sync::Arc;

/// Declared type of a member.
///
/// Class references go by name and are resolved against the engine's class
/// catalog at use time, so a class can declare members of its own type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Str,
    /// Any value; the concrete class is always written.
    Any,
    /// A named user class.
    Class(String),
    /// A named generic class with its type arguments.
    Parameterized(String, Vec<FieldType>),
    /// Built-in list with its element type.
    List(Box<FieldType>),
    /// A type parameter of the declaring class.
    TypeVar(String),
}

impl FieldType {
    pub fn class(name: impl Into<String>) -> Self {
        FieldType::Class(name.into())
    }

    pub fn parameterized(name: impl Into<String>, args: Vec<FieldType>) -> Self {
        FieldType::Parameterized(name.into(), args)
    }

    pub fn list_of(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    pub fn type_var(name: impl Into<String>) -> Self {
        FieldType::TypeVar(name.into())
    }

    /// Inline numeric/bool/char member that can never be null.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            FieldType::Bool
                | FieldType::Byte
                | FieldType::Short
                | FieldType::Int
                | FieldType::Long
                | FieldType::Float
                | FieldType::Double
                | FieldType::Char
        )
    }

    pub fn describe(&self) -> String {
        match self {
            FieldType::Bool => "boolean".into(),
            FieldType::Byte => "byte".into(),
            FieldType::Short => "short".into(),
            FieldType::Int => "int".into(),
            FieldType::Long => "long".into(),
            FieldType::Float => "float".into(),
            FieldType::Double => "double".into(),
            FieldType::Char => "char".into(),
            FieldType::Str => "String".into(),
            FieldType::Any => "Object".into(),
            FieldType::Class(name) => name.clone(),
            FieldType::Parameterized(name, args) => {
                let args: Vec<String> = args.iter().map(FieldType::describe).collect();
                format!("{}<{}>", name, args.join(", "))
            }
            FieldType::List(element) => format!("List<{}>", element.describe()),
            FieldType::TypeVar(name) => name.clone(),
        }
    }
}

/// One declared member of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub is_static: bool,
    pub is_transient: bool,
    /// `None` defers to the engine's `fields_can_be_null` setting.
    pub nullable: Option<bool>,
    /// Encode int/long members as varints.
    pub var_int: bool,
    /// Varint members favour non-negative values (no zig-zag).
    pub optimize_positive: bool,
    /// Wire key for the tag-keyed codec.
    pub tag: Option<u32>,
    /// First type version that carries this member.
    pub since: u32,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_transient: false,
            nullable: None,
            var_int: true,
            optimize_positive: true,
            tag: None,
            since: 0,
        }
    }

    pub fn with_tag(mut self, tag: u32) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn since(mut self, version: u32) -> Self {
        self.since = version;
        self
    }

    pub fn transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Write int/long as fixed-width big-endian instead of varint.
    pub fn fixed_width(mut self) -> Self {
        self.var_int = false;
        self
    }

    /// Zig-zag encode so small negative values stay short.
    pub fn zigzag(mut self) -> Self {
        self.optimize_positive = false;
        self
    }
}

/// A user class: name, ancestry, type parameters and declared members.
///
/// Instances are laid out as a flat slot vector, root ancestor members
/// first, each class's members in declaration order.
#[derive(Debug)]
pub struct ClassDef {
    pub(super) name: String,
    pub(super) parent: Option<Arc<ClassDef>>,
    pub(super) type_params: Vec<String>,
    pub(super) fields: Vec<FieldDef>,
    pub(super) is_final: bool,
    pub(super) instantiable: bool,
    pub(super) slot_base: usize,
}

impl ClassDef {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ClassDef>> {
        self.parent.as_ref()
    }

    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    /// Members declared by this class only.
    pub fn declared_fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Has a usable no-argument constructor.
    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    /// Number of ancestors above this class.
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.depth() + 1)
    }

    /// Slots an instance needs, inherited members included.
    pub fn slot_count(&self) -> usize {
        self.slot_base + self.fields.len()
    }

    /// `self` first, then each ancestor up to the root.
    pub fn ancestry(&self) -> Ancestry<'_> {
        Ancestry { next: Some(self) }
    }

    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.ancestry().any(|c| c.name == name)
    }

    /// Every member with its slot, root ancestor first.
    pub fn all_fields(&self) -> Vec<(usize, &ClassDef, &FieldDef)> {
        let mut chain: Vec<&ClassDef> = self.ancestry().collect();
        chain.reverse();
        let mut out = Vec::with_capacity(self.slot_count());
        for class in chain {
            for (i, field) in class.fields.iter().enumerate() {
                out.push((class.slot_base + i, class, field));
            }
        }
        out
    }

    /// Slot of the most derived member called `name`.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.ancestry().find_map(|class| {
            class
                .fields
                .iter()
                .position(|f| f.name == name)
                .map(|i| class.slot_base + i)
        })
    }

    pub fn field_at(&self, slot: usize) -> Option<&FieldDef> {
        self.ancestry().find_map(|class| {
            if slot >= class.slot_base && slot < class.slot_count() {
                class.fields.get(slot - class.slot_base)
            } else {
                None
            }
        })
    }
}

/// Iterator over a class and its ancestors.
pub struct Ancestry<'a> {
    next: Option<&'a ClassDef>,
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = &'a ClassDef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}
