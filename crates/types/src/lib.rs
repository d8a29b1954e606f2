use std::cmp::Ordering;
use std::fmt;

/// Attribute data types understood by the record and index layers.
///
/// The discriminant codes are part of the on-disk table header format and
/// must stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AttrType {
    Int,
    Str,
    Float,
    Bool,
}

impl AttrType {
    /// Stable on-disk code for this type.
    pub fn code(self) -> i32 {
        match self {
            AttrType::Int => 0,
            AttrType::Str => 1,
            AttrType::Float => 2,
            AttrType::Bool => 3,
        }
    }

    /// Inverse of [`AttrType::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AttrType::Int),
            1 => Some(AttrType::Str),
            2 => Some(AttrType::Float),
            3 => Some(AttrType::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrType::Int => "INT",
            AttrType::Str => "STRING",
            AttrType::Float => "FLOAT",
            AttrType::Bool => "BOOL",
        };
        f.write_str(name)
    }
}

/// Runtime representation of a single attribute value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Int(i32),
    Str(String),
    Float(f32),
    Bool(bool),
}

impl Value {
    /// The attribute type this value belongs to.
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Int(_) => AttrType::Int,
            Value::Str(_) => AttrType::Str,
            Value::Float(_) => AttrType::Float,
            Value::Bool(_) => AttrType::Bool,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compare two values of the same type; `None` for cross-type pairs
    /// and for unordered float pairs (NaN).
    pub fn cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Strict same-type equality; `None` for cross-type pairs.
    pub fn eq_same_type(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.eq(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.eq(b)),
            (Value::Float(a), Value::Float(b)) => Some(a.eq(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.eq(b)),
            _ => None,
        }
    }
}
