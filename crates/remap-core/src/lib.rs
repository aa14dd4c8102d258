//! Convention-based object mapping.
//!
//! A [`Mapper`] compiles a transformation for each pair of
//! [shapes](remap_model::Shape) it is asked to map, matching destination
//! fields to source fields by name, and caches it in its [`Registry`].
//! Nested shapes, lists and optional values are mapped recursively, and
//! type converters, explicit mappers and post-processing steps can be
//! registered to cover what the naming convention does not.
//!
//! Compilation does not fail on fields it cannot bind: such fields keep
//! their default value, and the [`PlanSummary`] of the pair records why.
//! [`remap_model::MapperOptions::strict`] turns unresolved fields into
//! errors instead.

mod builder;
mod compiler;
pub mod error;
mod mapper;
pub mod plan;
pub mod registry;
pub mod scan;

pub use builder::MappingBuilder;
pub use error::{MapError, Result};
pub use mapper::Mapper;
pub use plan::{FieldSummary, PlanSummary, SkipReason};
pub use registry::{Converter, Registry, Transformation, Transformer};
pub use scan::{ShapeCatalog, default_scan_predicate};

pub use remap_model::{
    FieldRenames, Mappable, MapperOptions, Shape, ShapePair, UnresolvedFieldPolicy, enum_shape,
    shape,
};
