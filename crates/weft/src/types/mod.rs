// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information: built-in leaf types, user class definitions
//! and the member layouts derived from them.

mod builder;
mod class;
mod members;

pub use builder::ClassBuilder;
pub use class::{ClassDef, FieldDef, FieldType};
pub use members::{discover_members, Member};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Types every engine knows without user registration.
///
/// The order of [`Builtin::ALL`] is the order of default registration and
/// therefore fixes their wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Int,
    Str,
    Float,
    Bool,
    Byte,
    Char,
    Short,
    Long,
    Double,
    List,
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Int,
        Builtin::Str,
        Builtin::Float,
        Builtin::Bool,
        Builtin::Byte,
        Builtin::Char,
        Builtin::Short,
        Builtin::Long,
        Builtin::Double,
        Builtin::List,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Int => "int",
            Builtin::Str => "String",
            Builtin::Float => "float",
            Builtin::Bool => "boolean",
            Builtin::Byte => "byte",
            Builtin::Char => "char",
            Builtin::Short => "short",
            Builtin::Long => "long",
            Builtin::Double => "double",
            Builtin::List => "List",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Handle to a runtime type: either a built-in or a user class.
///
/// Equality and hashing go by name; class names are unique per engine.
#[derive(Debug, Clone)]
pub enum TypeHandle {
    Builtin(Builtin),
    Class(Arc<ClassDef>),
}

impl TypeHandle {
    pub fn name(&self) -> &str {
        match self {
            TypeHandle::Builtin(b) => b.name(),
            TypeHandle::Class(class) => class.name(),
        }
    }

    pub fn as_class(&self) -> Option<&Arc<ClassDef>> {
        match self {
            TypeHandle::Class(class) => Some(class),
            TypeHandle::Builtin(_) => None,
        }
    }

    /// Values of this type have identity (can be aliased or form cycles).
    pub fn has_identity(&self) -> bool {
        matches!(
            self,
            TypeHandle::Class(_) | TypeHandle::Builtin(Builtin::List)
        )
    }

    /// No subtype can appear where this type is declared.
    pub fn is_final(&self) -> bool {
        match self {
            TypeHandle::Builtin(_) => true,
            TypeHandle::Class(class) => class.is_final(),
        }
    }

    /// `self` can stand where `base` is declared.
    pub fn is_assignable_to(&self, base: &TypeHandle) -> bool {
        match (self, base) {
            (TypeHandle::Class(class), TypeHandle::Class(base)) => class.is_subclass_of(base.name()),
            _ => self == base,
        }
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for TypeHandle {}

impl Hash for TypeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Builtin> for TypeHandle {
    fn from(b: Builtin) -> Self {
        TypeHandle::Builtin(b)
    }
}

impl From<Arc<ClassDef>> for TypeHandle {
    fn from(class: Arc<ClassDef>) -> Self {
        TypeHandle::Class(class)
    }
}

impl From<&Arc<ClassDef>> for TypeHandle {
    fn from(class: &Arc<ClassDef>) -> Self {
        TypeHandle::Class(Arc::clone(class))
    }
}
