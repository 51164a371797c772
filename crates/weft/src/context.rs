// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-call scratch state.
//!
//! A fresh context is created for every top-level write, read or copy and
//! threaded through every codec call. It holds the reference table, the
//! generics scope, per-class schema flags and the per-stream class-name
//! ids, so the [`Engine`](crate::Engine) itself carries no call state.

use crate::config::FIRST_ORDINAL;
use crate::error::{Error, ErrorKind, Result};
use crate::registry::Registration;
use crate::types::FieldType;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Stack of type-variable bindings.
///
/// Each member visit pushes a frame: the bindings of the member's
/// parameterized type, or a barrier when it has none. Lookups walk down to
/// the nearest barrier, so a class only ever sees the bindings its own
/// enclosing member established.
#[derive(Debug, Default)]
pub struct GenericsScope {
    entries: Vec<Option<(String, FieldType)>>,
}

impl GenericsScope {
    /// Push one frame; returns the entry count to hand back to [`pop`](Self::pop).
    pub fn push(&mut self, bindings: Vec<(String, FieldType)>) -> usize {
        if bindings.is_empty() {
            self.entries.push(None);
            return 1;
        }
        let count = bindings.len();
        self.entries.extend(bindings.into_iter().map(Some));
        count
    }

    pub fn pop(&mut self, count: usize) {
        let keep = self.entries.len().saturating_sub(count);
        self.entries.truncate(keep);
    }

    pub fn resolve(&self, var: &str) -> Option<&FieldType> {
        for entry in self.entries.iter().rev() {
            match entry {
                None => return None,
                Some((name, ty)) if name == var => return Some(ty),
                Some(_) => {}
            }
        }
        None
    }

    /// Substitute every bound type variable in `ty`. Unbound variables
    /// become `Any`.
    pub fn close(&self, ty: &FieldType) -> FieldType {
        match ty {
            FieldType::TypeVar(var) => self.resolve(var).cloned().unwrap_or(FieldType::Any),
            FieldType::Parameterized(name, args) => FieldType::Parameterized(
                name.clone(),
                args.iter().map(|arg| self.close(arg)).collect(),
            ),
            FieldType::List(element) => FieldType::List(Box::new(self.close(element))),
            other => other.clone(),
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// Write-side state for one top-level call.
#[derive(Debug)]
pub struct WriteContext {
    references: HashMap<usize, u32>,
    next_ordinal: u32,
    pub generics: GenericsScope,
    schemas_written: HashSet<String>,
    class_names: HashMap<String, u32>,
    depth: usize,
}

impl Default for WriteContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteContext {
    pub fn new() -> Self {
        Self {
            references: HashMap::new(),
            next_ordinal: FIRST_ORDINAL,
            generics: GenericsScope::default(),
            schemas_written: HashSet::new(),
            class_names: HashMap::new(),
            depth: 0,
        }
    }

    /// Ordinal already assigned to `identity`, if any.
    pub fn reference_of(&self, identity: usize) -> Option<u32> {
        self.references.get(&identity).copied()
    }

    /// Assign the next ordinal to `identity`.
    pub fn assign(&mut self, identity: usize) -> u32 {
        let ordinal = self.next_ordinal;
        self.references.insert(identity, ordinal);
        self.next_ordinal += 1;
        ordinal
    }

    /// Objects assigned so far.
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Returns `true` the first time it is called for `class` in this call.
    pub fn mark_schema_written(&mut self, class: &str) -> bool {
        self.schemas_written.insert(class.to_owned())
    }

    /// Per-stream id for a name-registered class, and whether it is new.
    pub fn class_name_id(&mut self, name: &str) -> (u32, bool) {
        if let Some(&id) = self.class_names.get(name) {
            return (id, false);
        }
        let id = self.class_names.len() as u32;
        self.class_names.insert(name.to_owned(), id);
        (id, true)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn enter(&mut self, max_depth: usize) -> Result<()> {
        if self.depth >= max_depth {
            return Err(ErrorKind::DepthExceeded { max_depth }.into());
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Read-side state for one top-level call.
#[derive(Debug)]
pub struct ReadContext {
    objects: Vec<Option<Value>>,
    pending: Vec<(u32, usize)>,
    pub generics: GenericsScope,
    schemas_read: HashMap<String, Arc<[Option<usize>]>>,
    class_names: HashMap<u32, Arc<Registration>>,
    depth: usize,
}

impl Default for ReadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadContext {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            pending: Vec::new(),
            generics: GenericsScope::default(),
            schemas_read: HashMap::new(),
            class_names: HashMap::new(),
            depth: 0,
        }
    }

    /// Reserve the next ordinal for an object about to be read at the
    /// current depth.
    pub(crate) fn reserve(&mut self) -> u32 {
        self.objects.push(None);
        let ordinal = self.objects.len() as u32 - 1 + FIRST_ORDINAL;
        self.pending.push((ordinal, self.depth));
        ordinal
    }

    /// Bind the object under construction to its reserved ordinal.
    ///
    /// Codecs call this right after allocating an instance and before
    /// reading its members, so members that point back at it resolve.
    /// Calls from codecs that were not given a reserved ordinal are ignored.
    pub fn reference(&mut self, value: Value) {
        if let Some(&(ordinal, depth)) = self.pending.last() {
            if depth == self.depth {
                self.pending.pop();
                self.objects[(ordinal - FIRST_ORDINAL) as usize] = Some(value);
            }
        }
    }

    /// Called by the engine once a tracked read returns.
    pub(crate) fn complete(&mut self, ordinal: u32, value: &Value) {
        if self.pending.last().map(|&(o, _)| o) == Some(ordinal) {
            self.pending.pop();
        }
        let slot = &mut self.objects[(ordinal - FIRST_ORDINAL) as usize];
        if slot.is_none() {
            *slot = Some(value.clone());
        }
    }

    pub fn resolve(&self, ordinal: u32) -> Result<Value> {
        let index = ordinal
            .checked_sub(FIRST_ORDINAL)
            .ok_or_else(|| Error::new(ErrorKind::UnknownReference(ordinal)))?;
        match self.objects.get(index as usize) {
            None => Err(ErrorKind::UnknownReference(ordinal).into()),
            Some(None) => Err(ErrorKind::UnresolvedReference(ordinal).into()),
            Some(Some(value)) => Ok(value.clone()),
        }
    }

    pub fn reference_count(&self) -> usize {
        self.objects.len()
    }

    /// Cached mapping from stream member index to local member index.
    pub fn schema(&self, class: &str) -> Option<Arc<[Option<usize>]>> {
        self.schemas_read.get(class).cloned()
    }

    pub fn store_schema(&mut self, class: &str, mapping: Arc<[Option<usize>]>) {
        self.schemas_read.insert(class.to_owned(), mapping);
    }

    pub(crate) fn class_by_name_id(&self, id: u32) -> Option<Arc<Registration>> {
        self.class_names.get(&id).cloned()
    }

    pub(crate) fn bind_class_name_id(&mut self, id: u32, registration: Arc<Registration>) {
        self.class_names.insert(id, registration);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn enter(&mut self, max_depth: usize) -> Result<()> {
        if self.depth >= max_depth {
            return Err(ErrorKind::DepthExceeded { max_depth }.into());
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// State for one deep copy: originals mapped to their copies.
#[derive(Debug, Default)]
pub struct CopyContext {
    copies: HashMap<usize, Value>,
    depth: usize,
}

impl CopyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `copy` as the duplicate of `original`. Codecs call this right
    /// after allocating the copy, before copying members.
    pub fn reference(&mut self, original: &Value, copy: &Value) {
        if let Some(identity) = original.identity() {
            self.copies.entry(identity).or_insert_with(|| copy.clone());
        }
    }

    pub fn copy_of(&self, original: &Value) -> Option<Value> {
        original
            .identity()
            .and_then(|identity| self.copies.get(&identity).cloned())
    }

    pub fn enter(&mut self, max_depth: usize) -> Result<()> {
        if self.depth >= max_depth {
            return Err(ErrorKind::DepthExceeded { max_depth }.into());
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
