//! Runtime value representation for the L# VM.
//!
//! Values are what live on the operand stack and in variable slots.

use std::fmt;

/// Runtime value.
///
/// `Str` holds an index into the VM's object table, not the string itself.
/// The indirection lets the collector move objects by rewriting indices.
#[derive(Debug, Clone, Copy, Default)]
pub enum Value {
    /// 32-bit integer.
    Int(i32),
    /// 64-bit float. Every numeric literal loads as a double.
    Double(f64),
    /// Object table index of a string.
    Str(usize),
    /// Boolean (`on` / `off` in source).
    Bool(bool),
    /// Absence of a value.
    #[default]
    Null,
}

/// The kind of a [`Value`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Double,
    Str,
    Bool,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Str => "string",
            ValueKind::Bool => "bool",
            ValueKind::Null => "null",
        };
        f.write_str(name)
    }
}

// Doubles compare bitwise, as operands do. The VM's Eq opcode uses IEEE
// comparison instead; this impl is for tests and containers.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::Str(_) => ValueKind::Str,
            Value::Bool(_) => ValueKind::Bool,
            Value::Null => ValueKind::Null,
        }
    }

    /// The object index, if this is a string reference.
    pub fn object_index(&self) -> Option<usize> {
        match self {
            Value::Str(index) => Some(*index),
            _ => None,
        }
    }
}
