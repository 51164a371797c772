// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value model for object graphs.

mod object;

pub use object::{default_for, ListRef, ObjectRef};

use crate::types::{Builtin, TypeHandle};
use std::collections::HashMap;

/// A node of an object graph.
///
/// `PartialEq` compares leaves by value and `Object`/`List` by identity.
/// Use [`graph_eq`] for deep structural comparison.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Str(String),
    Object(ObjectRef),
    List(ListRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Runtime type, `None` for `Null`.
    pub fn type_handle(&self) -> Option<TypeHandle> {
        let builtin = match self {
            Value::Null => return None,
            Value::Object(obj) => return Some(TypeHandle::Class(obj.class())),
            Value::Bool(_) => Builtin::Bool,
            Value::Byte(_) => Builtin::Byte,
            Value::Short(_) => Builtin::Short,
            Value::Int(_) => Builtin::Int,
            Value::Long(_) => Builtin::Long,
            Value::Float(_) => Builtin::Float,
            Value::Double(_) => Builtin::Double,
            Value::Char(_) => Builtin::Char,
            Value::Str(_) => Builtin::Str,
            Value::List(_) => Builtin::List,
        };
        Some(TypeHandle::Builtin(builtin))
    }

    pub fn type_name(&self) -> String {
        self.type_handle()
            .map_or_else(|| "null".to_owned(), |ty| ty.name().to_owned())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Identity key for `Object`/`List`, `None` for leaves.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(obj.addr()),
            Value::List(list) => Some(list.addr()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

macro_rules! impl_from_value {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(i8, Byte);
impl_from_value!(i16, Short);
impl_from_value!(i32, Int);
impl_from_value!(i64, Long);
impl_from_value!(f32, Float);
impl_from_value!(f64, Double);
impl_from_value!(char, Char);
impl_from_value!(String, Str);
impl_from_value!(ObjectRef, Object);
impl_from_value!(ListRef, List);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Deep comparison of two graphs.
///
/// Leaves compare by value, instances by class and members. The sharing
/// structure must match too: if two paths in `a` reach one instance, the
/// same two paths in `b` must reach one instance. Cycles terminate.
pub fn graph_eq(a: &Value, b: &Value) -> bool {
    GraphEq::default().eq(a, b)
}

#[derive(Default)]
struct GraphEq {
    forward: HashMap<usize, usize>,
    backward: HashMap<usize, usize>,
}

impl GraphEq {
    /// Records `a <-> b`; returns `Some(result)` when the pair was decided
    /// by an earlier visit.
    fn pair(&mut self, a: usize, b: usize) -> Option<bool> {
        match (self.forward.get(&a), self.backward.get(&b)) {
            (Some(&fb), Some(&ba)) => Some(fb == b && ba == a),
            (None, None) => {
                self.forward.insert(a, b);
                self.backward.insert(b, a);
                None
            }
            _ => Some(false),
        }
    }

    fn eq(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Object(x), Value::Object(y)) => {
                if let Some(decided) = self.pair(x.addr(), y.addr()) {
                    return decided;
                }
                let class = x.class();
                if class.name() != y.class().name() {
                    return false;
                }
                (0..class.slot_count()).all(|slot| self.eq(&x.get(slot), &y.get(slot)))
            }
            (Value::List(x), Value::List(y)) => {
                if let Some(decided) = self.pair(x.addr(), y.addr()) {
                    return decided;
                }
                let (xs, ys) = (x.items(), y.items());
                xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(l, r)| self.eq(l, r))
            }
            _ => a == b,
        }
    }
}
