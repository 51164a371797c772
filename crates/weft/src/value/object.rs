// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Identity-bearing values: class instances and lists.
//!
//! Both are shared handles (`Rc<RefCell<..>>`); cloning a handle aliases the
//! same instance, which is what lets a graph contain shared members and
//! cycles.

use super::Value;
use crate::error::{ErrorKind, Result};
use crate::types::{ClassDef, FieldType};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Default value a fresh instance holds in a slot of this declared type.
pub fn default_for(ty: &FieldType) -> Value {
    match ty {
        FieldType::Bool => Value::Bool(false),
        FieldType::Byte => Value::Byte(0),
        FieldType::Short => Value::Short(0),
        FieldType::Int => Value::Int(0),
        FieldType::Long => Value::Long(0),
        FieldType::Float => Value::Float(0.0),
        FieldType::Double => Value::Double(0.0),
        FieldType::Char => Value::Char('\0'),
        _ => Value::Null,
    }
}

struct Object {
    class: Arc<ClassDef>,
    slots: Vec<Value>,
}

/// Shared handle to a class instance.
///
/// The slot vector is the instance's accessor table: members are read and
/// written by slot index (see [`ClassDef::slot_of`]) or by name.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Allocate an instance with every member at its default.
    pub fn new(class: &Arc<ClassDef>) -> Self {
        let mut slots = vec![Value::Null; class.slot_count()];
        for (slot, _, field) in class.all_fields() {
            slots[slot] = default_for(&field.ty);
        }
        ObjectRef(Rc::new(RefCell::new(Object {
            class: Arc::clone(class),
            slots,
        })))
    }

    pub fn class(&self) -> Arc<ClassDef> {
        Arc::clone(&self.0.borrow().class)
    }

    pub fn class_name(&self) -> String {
        self.0.borrow().class.name().to_owned()
    }

    /// Value in `slot`, `Null` when out of range.
    pub fn get(&self, slot: usize) -> Value {
        self.0.borrow().slots.get(slot).cloned().unwrap_or(Value::Null)
    }

    /// Store `value` in `slot`; out-of-range slots are ignored.
    pub fn set(&self, slot: usize, value: Value) {
        if let Some(target) = self.0.borrow_mut().slots.get_mut(slot) {
            *target = value;
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value> {
        let slot = self.slot_of(name)?;
        Ok(self.get(slot))
    }

    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let slot = self.slot_of(name)?;
        self.set(slot, value.into());
        Ok(())
    }

    /// Builder-style `set_field` for constructing test and sample graphs.
    pub fn with(self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set_field(name, value)?;
        Ok(self)
    }

    fn slot_of(&self, name: &str) -> Result<usize> {
        let inner = self.0.borrow();
        inner.class.slot_of(name).ok_or_else(|| {
            ErrorKind::NoSuchMember {
                class: inner.class.name().to_owned(),
                member: name.to_owned(),
            }
            .into()
        })
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key, stable while the instance is alive.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.0.borrow().class.name(), self.addr())
    }
}

/// Shared handle to a list.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<Vec<Value>>>);

impl ListRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        ListRef(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Copy of the current elements (handles inside are still shared).
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List[{}]@{:#x}", self.len(), self.addr())
    }
}
