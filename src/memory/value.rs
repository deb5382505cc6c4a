//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime value
//! a program can produce, and the [`Type`] tag used for runtime type checks.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer
//! - [`Value::Bool`]: boolean
//! - [`Value::String`]: owned text
//! - [`Value::Reference`]: heap address plus the type of the cell it points to
//!
//! There is no implicit coercion: every operator compares [`Type`]s
//! structurally before touching a payload.

use std::fmt;

/// Heap address type. Address `0` is never allocated and acts as null.
pub type Address = u64;

/// Static type tag of a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    String,
    Ref(Box<Type>),
}

impl Type {
    /// Convenience constructor for `Ref(inner)`
    pub fn reference(inner: Type) -> Self {
        Type::Ref(Box::new(inner))
    }

    /// Value a freshly declared variable of this type is bound to
    pub fn default_value(&self) -> Value {
        match self {
            Type::Int => Value::Int(0),
            Type::Bool => Value::Bool(false),
            Type::String => Value::String(String::new()),
            Type::Ref(inner) => Value::Reference {
                address: 0,
                location: (**inner).clone(),
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Ref(inner) => write!(f, "Ref({})", inner),
        }
    }
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Int(i64),
    Bool(bool),
    String(String),
    Reference { address: Address, location: Type },
}

impl Value {
    /// Type tag matching this value's payload
    pub fn type_of(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
            Value::String(_) => Type::String,
            Value::Reference { location, .. } => Type::reference(location.clone()),
        }
    }

    /// Whether both values carry the same type tag
    pub fn equal_type(&self, other: &Value) -> bool {
        self.type_of() == other.type_of()
    }

    /// Get the integer payload, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean payload, returns None if not a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the text payload, returns None if not a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the address, returns None if not a Reference
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Value::Reference { address, .. } => Some(*address),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Reference { address, location } => write!(f, "({}, {})", address, location),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
