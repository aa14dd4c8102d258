//! Shape introspection: the traits mapped types implement and the
//! descriptors the compiler walks.
//!
//! Rust has no runtime reflection, so a type takes part in mapping by
//! implementing [`Mappable`] (lowering to and from [`Value`]) and, for record
//! types, [`Shape`] (listing its fields). The [`crate::shape!`] and
//! [`crate::enum_shape!`] macros write both impls for plain structs and
//! fieldless enums.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ValueError;
use crate::types::{ShapeRef, ValueType};
use crate::value::Value;

/// A type that can be lowered into a [`Value`] and rebuilt from one.
pub trait Mappable: Sized + 'static {
    fn value_type() -> ValueType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ValueError>;
}

/// A record type with named, typed fields.
pub trait Shape: Mappable {
    /// Display name of the shape, also used by convention-based scanning.
    const NAME: &'static str;

    fn descriptor() -> ShapeDescriptor;

    fn shape_ref() -> ShapeRef {
        ShapeRef::of::<Self>()
    }
}

/// One named field of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ty: ValueType,
}

/// Field layout of a record shape.
#[derive(Debug, Clone)]
pub struct ShapeDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    constructor: Option<fn() -> Value>,
}

impl ShapeDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            constructor: None,
        }
    }

    /// Appends a field; declaration order is preserved.
    pub fn field(mut self, name: &'static str, ty: ValueType) -> Self {
        self.fields.push(FieldDescriptor { name, ty });
        self
    }

    /// Marks the shape as default-constructible.
    pub fn constructible_with(mut self, constructor: fn() -> Value) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn find(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn constructor(&self) -> Option<fn() -> Value> {
        self.constructor
    }

    /// Builds the default instance, if the shape has one.
    pub fn construct(&self) -> Option<Value> {
        self.constructor.map(|constructor| constructor())
    }
}

/// Constructor used by [`crate::shape!`] for `Default` shapes.
pub fn default_instance<T: Mappable + Default>() -> Value {
    T::default().to_value()
}

macro_rules! int_mappable {
    ($($ty:ty => $value_type:ident, $variant:ident, $wide:ty);* $(;)?) => {
        $(
            impl Mappable for $ty {
                fn value_type() -> ValueType {
                    ValueType::$value_type
                }

                fn to_value(&self) -> Value {
                    Value::$variant(<$wide>::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(raw) => <$ty>::try_from(raw).map_err(|_| {
                            ValueError::OutOfRange {
                                target: stringify!($ty),
                                value: raw.to_string(),
                            }
                        }),
                        other => Err(ValueError::mismatch(stringify!($ty), other.kind())),
                    }
                }
            }
        )*
    };
}

int_mappable! {
    i32 => I32, Int, i64;
    i64 => I64, Int, i64;
    u32 => U32, UInt, u64;
    u64 => U64, UInt, u64;
}

impl Mappable for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(flag) => Ok(flag),
            other => Err(ValueError::mismatch("bool", other.kind())),
        }
    }
}

impl Mappable for f64 {
    fn value_type() -> ValueType {
        ValueType::F64
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(number) => Ok(number),
            other => Err(ValueError::mismatch("f64", other.kind())),
        }
    }
}

impl Mappable for f32 {
    fn value_type() -> ValueType {
        ValueType::F32
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    // Values lowered from an f32 come back exact. Finite values beyond the f32
    // range are rejected; values inside it are rounded to the nearest f32.
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(number) if number.is_finite() && number.abs() > f64::from(f32::MAX) => {
                Err(ValueError::OutOfRange {
                    target: "f32",
                    value: number.to_string(),
                })
            }
            Value::Float(number) => Ok(number as f32),
            other => Err(ValueError::mismatch("f32", other.kind())),
        }
    }
}

impl Mappable for String {
    fn value_type() -> ValueType {
        ValueType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(ValueError::mismatch("String", other.kind())),
        }
    }
}

impl Mappable for NaiveDate {
    fn value_type() -> ValueType {
        ValueType::Date
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Date(date) => Ok(date),
            other => Err(ValueError::mismatch("NaiveDate", other.kind())),
        }
    }
}

impl Mappable for NaiveDateTime {
    fn value_type() -> ValueType {
        ValueType::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::DateTime(datetime) => Ok(datetime),
            other => Err(ValueError::mismatch("NaiveDateTime", other.kind())),
        }
    }
}

impl<T: Mappable> Mappable for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Mappable::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(ValueError::mismatch(
                Self::value_type().to_string(),
                other.kind(),
            )),
        }
    }
}

impl<T: Mappable> Mappable for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Optional(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Boxing is transparent: `Box<T>` has the same value type as `T`.
impl<T: Mappable> Mappable for Box<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().to_value()
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}
