//! The public mapping facade.

use std::sync::Arc;

use remap_model::{
    FieldRenames, Mappable, MapperOptions, ShapePair, ShapeRef, Value, ValueError, ValueType,
};
use tracing::{debug, trace, warn};

use crate::builder::MappingBuilder;
use crate::compiler::Compiler;
use crate::error::{MapError, Result};
use crate::plan::PlanSummary;
use crate::registry::{Converter, Registry, Transformation, Transformer};
use crate::scan::{ShapeCatalog, default_scan_predicate};

/// Registers mappings between shapes and maps instances.
///
/// Configuration methods take `&mut self`; mapping methods take `&self`.
/// Configure a mapper fully, then share it (for example behind an `Arc`)
/// for concurrent mapping.
///
/// ```
/// use remap_core::Mapper;
/// use remap_model::shape;
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// #[derive(Debug, Default)]
/// struct UserDto {
///     id: i32,
///     name: String,
/// }
///
/// shape!(User { id: i32, name: String });
/// shape!(UserDto { id: i32, name: String });
///
/// let mut mapper = Mapper::new();
/// mapper.auto_map::<User, UserDto>().unwrap();
///
/// let dto: UserDto = mapper
///     .map(&User { id: 1, name: "Ada".to_string() })
///     .unwrap();
/// assert_eq!(dto.name, "Ada");
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
    registry: Registry,
    options: MapperOptions,
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MapperOptions) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Compiles and registers `S -> D` and every nested pair it needs.
    ///
    /// Does nothing if the pair is already registered.
    pub fn auto_map<S: Mappable, D: Mappable>(&mut self) -> Result<&mut Self> {
        self.auto_map_pair(&ShapePair::of::<S, D>(), &FieldRenames::new())
    }

    /// Like [`Mapper::auto_map`], with destination fields fed from
    /// differently named source fields. The table is also consulted for
    /// nested pairs compiled on the way; an entry whose source field a shape
    /// lacks falls back to the identically named field.
    pub fn auto_map_with<S: Mappable, D: Mappable>(
        &mut self,
        renames: &FieldRenames,
    ) -> Result<&mut Self> {
        self.auto_map_pair(&ShapePair::of::<S, D>(), renames)
    }

    pub fn auto_map_pair(&mut self, pair: &ShapePair, renames: &FieldRenames) -> Result<&mut Self> {
        let policy = self.options.unresolved_fields;
        Compiler::new(&mut self.registry, renames, policy).register(pair)?;
        Ok(self)
    }

    /// Registers `S -> D` and `D -> S`. Renames are not mirrored; register
    /// the reverse direction with [`FieldRenames::reversed`] when needed.
    pub fn two_way_auto_map<S: Mappable, D: Mappable>(&mut self) -> Result<&mut Self> {
        self.auto_map::<S, D>()?;
        self.auto_map::<D, S>()
    }

    /// Registers `S -> D` and returns a builder scoped to that pair.
    pub fn build_auto_map<S: Mappable, D: Mappable>(
        &mut self,
    ) -> Result<MappingBuilder<'_, S, D>> {
        self.auto_map::<S, D>()?;
        Ok(MappingBuilder::new(self))
    }

    pub fn build_auto_map_with<S: Mappable, D: Mappable>(
        &mut self,
        renames: &FieldRenames,
    ) -> Result<MappingBuilder<'_, S, D>> {
        self.auto_map_with::<S, D>(renames)?;
        Ok(MappingBuilder::new(self))
    }

    /// Registers a hand-written mapping for `S -> D`, replacing any existing
    /// one. Auto mappings compiled earlier keep the transformation they
    /// captured.
    pub fn add_mapper<S, D, F>(&mut self, mapper: F) -> &mut Self
    where
        S: Mappable,
        D: Mappable,
        F: Fn(&S) -> D + Send + Sync + 'static,
    {
        let pair = ShapePair::of::<S, D>();
        debug!(pair = %pair, "registered explicit mapping");
        self.registry.set(pair, lift(mapper));
        self
    }

    /// Registers a leaf conversion used by later auto mappings whenever a
    /// source field of type `S` feeds a destination field of type `D`.
    pub fn add_type_converter<S, D, F>(&mut self, converter: F) -> &mut Self
    where
        S: Mappable,
        D: Mappable,
        F: Fn(&S) -> D + Send + Sync + 'static,
    {
        let pair = ShapePair::of::<S, D>();
        debug!(pair = %pair, "registered type converter");
        let converter: Converter = lift(converter);
        self.registry.set_converter(pair, converter);
        self
    }

    /// Appends a post-processing step for `S -> D`. Steps run in
    /// registration order after the pair's transformation, and only when
    /// `S -> D` is the pair being mapped.
    pub fn with_transform<S, D, F>(&mut self, action: F) -> &mut Self
    where
        S: Mappable,
        D: Mappable,
        F: Fn(&S, &mut D) + Send + Sync + 'static,
    {
        self.registry
            .append_transformer(ShapePair::of::<S, D>(), Transformer::new(action));
        self
    }

    /// Maps one instance with the registered transformation for `S -> D`.
    pub fn map<S: Mappable, D: Mappable>(&self, source: &S) -> Result<D> {
        let pair = ShapePair::of::<S, D>();
        let transformation = self.transformation(&pair)?;
        self.apply(&pair, &transformation, source)
    }

    /// Maps every element independently, preserving order. Fails on the
    /// first element that fails.
    pub fn map_many<S: Mappable, D: Mappable>(&self, sources: &[S]) -> Result<Vec<D>> {
        let pair = ShapePair::of::<S, D>();
        let transformation = self.transformation(&pair)?;
        sources
            .iter()
            .map(|source| self.apply(&pair, &transformation, source))
            .collect()
    }

    /// Maps one instance, auto-registering `S -> D` first if needed.
    pub fn ensure_map<S: Mappable, D: Mappable>(&mut self, source: &S) -> Result<D> {
        self.ensure_registered::<S, D>()?;
        self.map(source)
    }

    pub fn ensure_map_many<S: Mappable, D: Mappable>(&mut self, sources: &[S]) -> Result<Vec<D>> {
        self.ensure_registered::<S, D>()?;
        self.map_many(sources)
    }

    pub fn is_registered<S: Mappable, D: Mappable>(&self) -> bool {
        self.registry.contains(&ShapePair::of::<S, D>())
    }

    /// Plan of an auto-mapped pair. `None` for unregistered pairs and for
    /// pairs registered with [`Mapper::add_mapper`].
    pub fn plan_summary<S: Mappable, D: Mappable>(&self) -> Option<&PlanSummary> {
        self.registry.plan(&ShapePair::of::<S, D>())
    }

    /// Auto-maps every source/destination pair of the two catalogs whose
    /// names match by the configured suffix convention.
    pub fn auto_map_scan(
        &mut self,
        sources: &ShapeCatalog,
        destinations: &ShapeCatalog,
    ) -> Result<&mut Self> {
        let suffixes = self.options.scan_suffixes.clone();
        self.auto_map_scan_with(sources, destinations, |source, destination| {
            default_scan_predicate(suffixes.as_slice(), source, destination)
        })
    }

    /// Auto-maps every pair of the two catalogs accepted by `predicate`.
    ///
    /// Stops at the first pair that fails to compile; pairs registered before
    /// it stay registered.
    pub fn auto_map_scan_with<P>(
        &mut self,
        sources: &ShapeCatalog,
        destinations: &ShapeCatalog,
        predicate: P,
    ) -> Result<&mut Self>
    where
        P: Fn(&ShapeRef, &ShapeRef) -> bool,
    {
        let renames = FieldRenames::new();
        let mut matched = 0_usize;
        for source in sources.iter() {
            for destination in destinations.iter() {
                if source == destination || !predicate(source, destination) {
                    continue;
                }
                let pair = ShapePair::new(ValueType::Record(*source), ValueType::Record(*destination));
                self.auto_map_pair(&pair, &renames)?;
                matched += 1;
            }
        }
        debug!(matched, "scanned shape catalogs");
        Ok(self)
    }

    fn ensure_registered<S: Mappable, D: Mappable>(&mut self) -> Result<()> {
        let pair = ShapePair::of::<S, D>();
        if !self.registry.contains(&pair) {
            debug!(pair = %pair, "auto-registering on first use");
            self.auto_map_pair(&pair, &FieldRenames::new())?;
        }
        Ok(())
    }

    fn transformation(&self, pair: &ShapePair) -> Result<Transformation> {
        self.registry
            .get(pair)
            .ok_or_else(|| MapError::not_found(pair))
    }

    fn apply<S: Mappable, D: Mappable>(
        &self,
        pair: &ShapePair,
        transformation: &Transformation,
        source: &S,
    ) -> Result<D> {
        trace!(pair = %pair, "mapping instance");
        let value = transformation(&source.to_value())?;
        let mut destination = D::from_value(value)?;
        for transformer in self.registry.transformers(pair) {
            if !transformer.apply(source, &mut destination) {
                warn!(pair = %pair, "transformer registered for other types; skipped");
            }
        }
        Ok(destination)
    }
}

/// Wraps a typed function as a transformation over values.
fn lift<S, D, F>(function: F) -> Transformation
where
    S: Mappable,
    D: Mappable,
    F: Fn(&S) -> D + Send + Sync + 'static,
{
    Arc::new(move |value: &Value| -> std::result::Result<Value, ValueError> {
        let source = S::from_value(value.clone())?;
        Ok(function(&source).to_value())
    })
}
