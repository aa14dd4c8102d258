//! Static type identity for mapped values.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};

use crate::shape::{Shape, ShapeDescriptor};
use crate::value::Value;

/// Identity of a named Rust type.
///
/// Equality and hashing use the `TypeId` only; the name is for display.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Reference to a record shape whose descriptor is built on demand.
///
/// Holding a function pointer instead of the descriptor itself is what lets
/// a shape refer to itself (directly or through other shapes) without
/// building an infinite descriptor.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    tag: TypeTag,
    describe: fn() -> ShapeDescriptor,
}

impl ShapeRef {
    pub fn of<T: Shape>() -> Self {
        Self::new(TypeTag::of::<T>(T::NAME), T::descriptor)
    }

    pub fn new(tag: TypeTag, describe: fn() -> ShapeDescriptor) -> Self {
        Self { tag, describe }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn name(&self) -> &'static str {
        self.tag.name
    }

    pub fn descriptor(&self) -> ShapeDescriptor {
        (self.describe)()
    }
}

impl PartialEq for ShapeRef {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for ShapeRef {}

impl Hash for ShapeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type of a field or of a whole mapped value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Text,
    Date,
    DateTime,
    Enum(TypeTag),
    Record(ShapeRef),
    List(Box<ValueType>),
    Optional(Box<ValueType>),
}

impl ValueType {
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn as_shape(&self) -> Option<ShapeRef> {
        match self {
            Self::Record(shape) => Some(*shape),
            _ => None,
        }
    }

    /// The value a freshly constructed instance of this type holds.
    ///
    /// Returns `None` for enums and for shapes without a default
    /// constructor.
    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Bool => Some(Value::Bool(false)),
            Self::I32 | Self::I64 => Some(Value::Int(0)),
            Self::U32 | Self::U64 => Some(Value::UInt(0)),
            Self::F32 | Self::F64 => Some(Value::Float(0.0)),
            Self::Text => Some(Value::Text(String::new())),
            Self::Date => Some(Value::Date(NaiveDate::default())),
            Self::DateTime => Some(Value::DateTime(NaiveDateTime::default())),
            Self::Enum(_) => None,
            Self::Record(shape) => shape.descriptor().construct(),
            Self::List(_) => Some(Value::List(Vec::new())),
            Self::Optional(_) => Some(Value::Null),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Text => f.write_str("String"),
            Self::Date => f.write_str("NaiveDate"),
            Self::DateTime => f.write_str("NaiveDateTime"),
            Self::Enum(tag) => f.write_str(tag.name()),
            Self::Record(shape) => f.write_str(shape.name()),
            Self::List(inner) => write!(f, "Vec<{inner}>"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
        }
    }
}
