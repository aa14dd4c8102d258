//! Catalogs of shapes for convention-based registration.
//!
//! Rust has no module reflection, so the shapes a scan considers are listed
//! explicitly in a [`ShapeCatalog`].

use remap_model::{Shape, ShapeRef};

/// An ordered, duplicate-free list of record shapes.
#[derive(Debug, Clone, Default)]
pub struct ShapeCatalog {
    shapes: Vec<ShapeRef>,
}

impl ShapeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Shape>(mut self) -> Self {
        self.push(T::shape_ref());
        self
    }

    pub fn push(&mut self, shape: ShapeRef) {
        if !self.shapes.contains(&shape) {
            self.shapes.push(shape);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeRef> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl FromIterator<ShapeRef> for ShapeCatalog {
    fn from_iter<I: IntoIterator<Item = ShapeRef>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for shape in iter {
            catalog.push(shape);
        }
        catalog
    }
}

/// Matches when the destination's name is the source's name followed by one
/// of `suffixes`, e.g. `Order` and `OrderDto`.
pub fn default_scan_predicate<S: AsRef<str>>(
    suffixes: &[S],
    source: &ShapeRef,
    destination: &ShapeRef,
) -> bool {
    destination
        .name()
        .strip_prefix(source.name())
        .is_some_and(|rest| suffixes.iter().any(|suffix| suffix.as_ref() == rest))
}
