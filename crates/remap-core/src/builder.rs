//! Fluent configuration scoped to one shape pair.

use std::marker::PhantomData;

use remap_model::Mappable;

use crate::mapper::Mapper;

/// Returned by [`Mapper::build_auto_map`] once `S -> D` is registered.
///
/// Chains post-processing steps onto that pair, then hands the mapper back
/// with [`MappingBuilder::finish`].
#[must_use = "a builder does nothing unless steps are added to it"]
pub struct MappingBuilder<'m, S, D> {
    mapper: &'m mut Mapper,
    pair: PhantomData<fn(&S) -> D>,
}

impl<'m, S: Mappable, D: Mappable> MappingBuilder<'m, S, D> {
    pub(crate) fn new(mapper: &'m mut Mapper) -> Self {
        Self {
            mapper,
            pair: PhantomData,
        }
    }

    pub fn with_transform<F>(self, action: F) -> Self
    where
        F: Fn(&S, &mut D) + Send + Sync + 'static,
    {
        self.mapper.with_transform::<S, D, F>(action);
        self
    }

    pub fn finish(self) -> &'m mut Mapper {
        self.mapper
    }
}
