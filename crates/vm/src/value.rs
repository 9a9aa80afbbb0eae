//! The VM's runtime value representation.

use std::fmt;

/// A tagged scalar value living in one memory cell.
///
/// `Unset` is the default for a cell that has never been written -- reading
/// it yields the segment's scalar zero (§4.7), so `Unset` never actually
/// reaches arithmetic; [`Value::read`] normalizes it away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Unset,
}

impl Value {
    /// Resolve `Unset` to the numeric zero of `expected`, matching a cell
    /// that was declared but never assigned.
    pub fn read(self, expected: patito_core::Type) -> Value {
        match self {
            Value::Unset => match expected {
                patito_core::Type::Float => Value::Float(0.0),
                _ => Value::Int(0),
            },
            v => v,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
            Value::Unset => 0.0,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, Value::Int(_) | Value::Unset)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Unset => write!(f, "0"),
        }
    }
}

impl From<patito_core::ConstantValue> for Value {
    fn from(c: patito_core::ConstantValue) -> Self {
        match c {
            patito_core::ConstantValue::Int(i) => Value::Int(i),
            patito_core::ConstantValue::Float(f) => Value::Float(f),
        }
    }
}
