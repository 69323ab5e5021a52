//! Decoded field values.
//!
//! Records and header variables store their fields as [`Value`]s. The set of
//! variants is closed: every primitive the decoder produces maps onto one of
//! them, and repeated substructures become nested [`Value::List`]s.

use std::fmt;

use super::{HandleRef, Vector2, Vector3};

/// A single decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Point2(Vector2),
    Point3(Vector3),
    /// Direction rather than position (extrusions, axes, tangents).
    Vector3(Vector3),
    Str(String),
    HandleRef(HandleRef),
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<HandleRef> {
        match self {
            Value::HandleRef(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_point2(&self) -> Option<Vector2> {
        match self {
            Value::Point2(p) => Some(*p),
            _ => None,
        }
    }

    /// 3D position; a 2D point is lifted with z = 0.
    pub fn as_point3(&self) -> Option<Vector3> {
        match self {
            Value::Point3(p) | Value::Vector3(p) => Some(*p),
            Value::Point2(p) => Some(p.with_z(0.0)),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Point2(_) => "point2",
            Value::Point3(_) => "point3",
            Value::Vector3(_) => "vector3",
            Value::Str(_) => "str",
            Value::HandleRef(_) => "handle",
            Value::List(_) => "list",
        }
    }

    /// Raw byte blob as a list of integers.
    pub fn bytes(data: &[u8]) -> Value {
        Value::List(data.iter().map(|b| Value::Int(i64::from(*b))).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Point2(p) => write!(f, "{p}"),
            Value::Point3(p) | Value::Vector3(p) => write!(f, "{p}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::HandleRef(h) => write!(f, "<{h}>"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, u8, i16, u16, i32, u32, i64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Vector2> for Value {
    fn from(v: Vector2) -> Self {
        Value::Point2(v)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Point3(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<HandleRef> for Value {
    fn from(v: HandleRef) -> Self {
        Value::HandleRef(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}
