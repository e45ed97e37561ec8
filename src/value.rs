//! The engine's typed constant domain.
//!
//! This stands in for the host language's full type system (SPEC_FULL §3 "Value"):
//! the matching engine only ever needs to compare integers, booleans, and fact
//! handles, so that is all `Value` carries.

use serde::{Deserialize, Serialize};

use crate::fact::FactHandle;

/// A value appearing as a field, a literal in a constraint, or a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    /// Signed integer field or literal.
    Int(i64),
    /// Boolean field or literal.
    Bool(bool),
    /// A fact handle, e.g. the value of an outer pattern binding used bare.
    Handle(FactHandle),
}

impl Value {
    /// The integer this value holds, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean this value holds, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The fact handle this value holds, if it is one.
    pub fn as_handle(&self) -> Option<FactHandle> {
        match self {
            Value::Handle(h) => Some(*h),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<FactHandle> for Value {
    fn from(h: FactHandle) -> Self {
        Value::Handle(h)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Handle(h) => write!(f, "{h}"),
        }
    }
}
