//! Shape and value model for the remap object mapper.
//!
//! This crate is the introspection side of mapping: it describes what a
//! mapped type looks like ([`Shape`], [`ShapeDescriptor`], [`ValueType`]) and
//! how its instances are represented while a compiled transformation runs
//! ([`Value`], [`Record`]).

pub mod error;
mod macros;
pub mod options;
pub mod pair;
pub mod rename;
pub mod shape;
pub mod types;
pub mod value;

pub use error::{Result, ValueError};
pub use options::{MapperOptions, UnresolvedFieldPolicy};
pub use pair::ShapePair;
pub use rename::FieldRenames;
pub use shape::{FieldDescriptor, Mappable, Shape, ShapeDescriptor, default_instance};
pub use types::{ShapeRef, TypeTag, ValueType};
pub use value::{Record, Value};
