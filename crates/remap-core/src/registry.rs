//! Store of compiled transformations, type converters and transformers.
//!
//! The registry is owned by a [`crate::Mapper`] and lives as long as it does.
//! Entries are only ever added or replaced, never removed; a replaced
//! transformation is retired but kept alive, so mappings compiled against it
//! keep working. The registry is not
//! internally synchronized: mutation needs `&mut self`, so configuration must
//! finish before the owning mapper is shared for lookups.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use remap_model::{ShapePair, Value, ValueError};

use crate::plan::PlanSummary;

/// Signature shared by compiled transformations and type converters.
pub type TransformFn = dyn Fn(&Value) -> Result<Value, ValueError> + Send + Sync;

/// A compiled (or explicitly registered) mapping from a source value to a new
/// destination value.
pub type Transformation = Arc<TransformFn>;

/// A leaf coercion between two value types, consulted by the compiler.
pub type Converter = Arc<TransformFn>;

/// Post-processing step run after a pair's transformation.
///
/// Stored type-erased; [`Transformer::apply`] returns `false` when the
/// arguments are not the types the transformer was registered for.
#[derive(Clone)]
pub struct Transformer {
    action: Arc<dyn Fn(&dyn Any, &mut dyn Any) -> bool + Send + Sync>,
}

impl Transformer {
    pub fn new<S, D, F>(action: F) -> Self
    where
        S: 'static,
        D: 'static,
        F: Fn(&S, &mut D) + Send + Sync + 'static,
    {
        Self {
            action: Arc::new(move |source: &dyn Any, destination: &mut dyn Any| {
                match (source.downcast_ref::<S>(), destination.downcast_mut::<D>()) {
                    (Some(source), Some(destination)) => {
                        action(source, destination);
                        true
                    }
                    _ => false,
                }
            }),
        }
    }

    pub fn apply(&self, source: &dyn Any, destination: &mut dyn Any) -> bool {
        (self.action)(source, destination)
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transformer")
    }
}

#[derive(Default)]
pub struct Registry {
    transformations: HashMap<ShapePair, Transformation>,
    converters: HashMap<ShapePair, Converter>,
    transformers: HashMap<ShapePair, Vec<Transformer>>,
    plans: HashMap<ShapePair, PlanSummary>,
    retired: Vec<Transformation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pair: &ShapePair) -> Option<Transformation> {
        self.transformations.get(pair).cloned()
    }

    pub fn contains(&self, pair: &ShapePair) -> bool {
        self.transformations.contains_key(pair)
    }

    /// Stores `transformation` unless the pair already has one.
    ///
    /// Returns `true` if it was stored.
    pub fn set_if_absent(&mut self, pair: ShapePair, transformation: Transformation) -> bool {
        if self.transformations.contains_key(&pair) {
            return false;
        }
        self.transformations.insert(pair, transformation);
        true
    }

    /// Stores `transformation`, replacing any existing one.
    ///
    /// The replaced transformation is retained for the registry's lifetime:
    /// auto mappings compiled earlier may still refer to it, including through
    /// deferred bindings. The plan summary of a replaced auto mapping no
    /// longer describes the pair and is dropped.
    pub fn set(&mut self, pair: ShapePair, transformation: Transformation) {
        self.plans.remove(&pair);
        if let Some(replaced) = self.transformations.insert(pair, transformation) {
            self.retired.push(replaced);
        }
    }

    pub fn append_transformer(&mut self, pair: ShapePair, transformer: Transformer) {
        self.transformers.entry(pair).or_default().push(transformer);
    }

    /// Transformers of a pair in registration order.
    pub fn transformers(&self, pair: &ShapePair) -> &[Transformer] {
        self.transformers
            .get(pair)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_converter(&self, pair: &ShapePair) -> Option<Converter> {
        self.converters.get(pair).cloned()
    }

    pub fn set_converter(&mut self, pair: ShapePair, converter: Converter) {
        self.converters.insert(pair, converter);
    }

    pub fn plan(&self, pair: &ShapePair) -> Option<&PlanSummary> {
        self.plans.get(pair)
    }

    pub(crate) fn record_plan(&mut self, pair: ShapePair, summary: PlanSummary) {
        self.plans.insert(pair, summary);
    }

    /// Number of registered transformations.
    pub fn len(&self) -> usize {
        self.transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    pub fn converter_count(&self) -> usize {
        self.converters.len()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &ShapePair> {
        self.transformations.keys()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("transformations", &self.transformations.len())
            .field("converters", &self.converters.len())
            .field("retired", &self.retired.len())
            .field(
                "transformers",
                &self.transformers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
