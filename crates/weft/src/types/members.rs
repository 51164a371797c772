// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member discovery for structural codecs.

use super::{ClassDef, FieldDef};

/// A serializable member together with the slot it is read from and
/// written to.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub slot: usize,
    /// Ancestor depth of the declaring class (root = 0).
    pub depth: usize,
    pub declared_in: String,
    pub field: FieldDef,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Trace entry used when an error unwinds through this member.
    pub fn trace_entry(&self) -> String {
        format!("{} ({})", self.field.name, self.declared_in)
    }
}

/// Ordered serializable members of `class`.
///
/// Walks the class and all its ancestors, drops static members (and
/// transient ones unless `include_transient`), then sorts by name with
/// shallower declaring classes first on ties. Both ends derive the same
/// order from the same definition.
pub fn discover_members(class: &ClassDef, include_transient: bool) -> Vec<Member> {
    let mut members: Vec<Member> = class
        .all_fields()
        .into_iter()
        .filter(|(_, _, field)| !field.is_static && (include_transient || !field.is_transient))
        .map(|(slot, owner, field)| Member {
            slot,
            depth: owner.depth(),
            declared_in: owner.name().to_owned(),
            field: field.clone(),
        })
        .collect();
    members.sort_by(|a, b| a.field.name.cmp(&b.field.name).then(a.depth.cmp(&b.depth)));
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldDef, FieldType};

    #[test]
    fn test_members_sorted_alphabetically() {
        let class = ClassDef::builder("Sample")
            .field("zeta", FieldType::Int)
            .field("alpha", FieldType::Int)
            .field("mid", FieldType::Str)
            .build();
        let members = discover_members(&class, false);
        let names: Vec<&str> = members
            .iter()
            .map(|m| m.field.name.as_str())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_members_ties_broken_by_depth() {
        let base = ClassDef::builder("Base").field("value", FieldType::Int).build();
        let derived = ClassDef::builder("Derived")
            .extends(&base)
            .field("value", FieldType::Str)
            .field("extra", FieldType::Bool)
            .build();
        let members = discover_members(&derived, false);
        let keys: Vec<(&str, &str, usize)> = members
            .iter()
            .map(|m| (m.name(), m.declared_in.as_str(), m.slot))
            .collect();
        assert_eq!(
            keys,
            vec![("extra", "Derived", 2), ("value", "Base", 0), ("value", "Derived", 1)]
        );
    }

    #[test]
    fn test_members_skip_static_and_transient() {
        let class = ClassDef::builder("Cache")
            .field("key", FieldType::Str)
            .member(FieldDef::new("hits", FieldType::Long).transient())
            .member(FieldDef::new("INSTANCES", FieldType::Int).static_member())
            .build();

        let names: Vec<String> = discover_members(&class, false)
            .into_iter()
            .map(|m| m.field.name)
            .collect();
        assert_eq!(names, vec!["key"]);

        let names: Vec<String> = discover_members(&class, true)
            .into_iter()
            .map(|m| m.field.name)
            .collect();
        assert_eq!(names, vec!["hits", "key"]);
    }
}
