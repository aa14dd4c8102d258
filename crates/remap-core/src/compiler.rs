//! Compiles shape pairs into registered transformations.
//!
//! The compiler walks the destination shape's fields in declaration order and
//! resolves each one against the source shape. Nested record pairs are
//! compiled recursively and registered along with the requested pair. A pair
//! that is reached again while it is still being compiled is bound through a
//! [`DeferredSlot`], which is filled once that compilation finishes.

use std::collections::HashMap;

use remap_model::{
    FieldDescriptor, FieldRenames, ShapeDescriptor, ShapePair, ShapeRef, UnresolvedFieldPolicy,
    ValueType,
};
use tracing::{debug, warn};

use crate::error::{MapError, Result};
use crate::plan::{
    Binding, BindingPlan, DeferredSlot, FieldPlan, PlanSummary, Resolution, SkipReason,
};
use crate::registry::{Registry, Transformation};

pub(crate) struct Compiler<'a> {
    registry: &'a mut Registry,
    renames: &'a FieldRenames,
    policy: UnresolvedFieldPolicy,
    in_progress: HashMap<ShapePair, DeferredSlot>,
    staged: HashMap<ShapePair, (Transformation, PlanSummary)>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        registry: &'a mut Registry,
        renames: &'a FieldRenames,
        policy: UnresolvedFieldPolicy,
    ) -> Self {
        Self {
            registry,
            renames,
            policy,
            in_progress: HashMap::new(),
            staged: HashMap::new(),
        }
    }

    /// Compiles `pair` and registers it together with every nested pair it
    /// needed. Nothing is registered if any part of the compilation fails.
    ///
    /// An already registered pair is returned unchanged.
    pub(crate) fn register(mut self, pair: &ShapePair) -> Result<Transformation> {
        let transformation = self.compile(pair)?;
        for (staged_pair, (staged, summary)) in std::mem::take(&mut self.staged) {
            debug!(pair = %staged_pair, "registered auto mapping");
            if self.registry.set_if_absent(staged_pair.clone(), staged) {
                self.registry.record_plan(staged_pair, summary);
            }
        }
        Ok(transformation)
    }

    fn lookup(&self, pair: &ShapePair) -> Option<Transformation> {
        self.registry
            .get(pair)
            .or_else(|| self.staged.get(pair).map(|(staged, _)| staged.clone()))
    }

    fn compile(&mut self, pair: &ShapePair) -> Result<Transformation> {
        if let Some(existing) = self.lookup(pair) {
            return Ok(existing);
        }

        self.in_progress.insert(pair.clone(), DeferredSlot::new());
        let planned = self.plan(pair);
        let slot = self.in_progress.remove(pair);
        let plan = planned?;

        let summary = plan.summary();
        let transformation = plan.into_transformation();
        if let Some(slot) = slot {
            slot.fill(&transformation);
        }
        self.staged
            .insert(pair.clone(), (transformation.clone(), summary));
        Ok(transformation)
    }

    fn plan(&mut self, pair: &ShapePair) -> Result<BindingPlan> {
        if pair.is_identity() {
            return Ok(BindingPlan::identity(pair.clone()));
        }

        if let (Some(source), Some(destination)) =
            (pair.source.as_shape(), pair.destination.as_shape())
        {
            return self.plan_fields(pair, source, destination);
        }

        let fallback =
            pair.destination
                .default_value()
                .ok_or_else(|| MapError::NotConstructible {
                    shape: pair.destination.to_string(),
                })?;
        match self.resolve_container(&pair.source, &pair.destination)? {
            Some(binding) => Ok(BindingPlan::whole(pair.clone(), binding, fallback)),
            None => {
                debug!(pair = %pair, "no binding between types; mapping yields the default value");
                Ok(BindingPlan::constant(pair.clone(), fallback))
            }
        }
    }

    fn plan_fields(
        &mut self,
        pair: &ShapePair,
        source: ShapeRef,
        destination: ShapeRef,
    ) -> Result<BindingPlan> {
        let destination_shape = destination.descriptor();
        let constructor =
            destination_shape
                .constructor()
                .ok_or_else(|| MapError::NotConstructible {
                    shape: destination.name().to_string(),
                })?;
        let source_shape = source.descriptor();

        let mut fields = Vec::with_capacity(destination_shape.fields().len());
        for field in destination_shape.fields() {
            let Some(source_field) = self.source_field(&source_shape, field.name) else {
                debug!(pair = %pair, field = field.name, "no source field; left at default");
                fields.push(FieldPlan {
                    destination: field.name,
                    source: None,
                    resolution: Resolution::Skip(SkipReason::NoSourceField),
                });
                continue;
            };

            let resolution = match self.resolve(&source_field.ty, &field.ty) {
                Ok(Some(binding)) => Resolution::Bind(binding),
                Ok(None) => {
                    if self.policy == UnresolvedFieldPolicy::Strict {
                        return Err(MapError::InvalidPropertyMapping {
                            shape: destination.name().to_string(),
                            field: field.name.to_string(),
                            source_type: source_field.ty.to_string(),
                            destination_type: field.ty.to_string(),
                        });
                    }
                    debug!(
                        pair = %pair,
                        field = field.name,
                        source_type = %source_field.ty,
                        destination_type = %field.ty,
                        "unresolved field; left at default"
                    );
                    Resolution::Skip(SkipReason::Unresolved)
                }
                Err(err) => {
                    if self.policy == UnresolvedFieldPolicy::Strict {
                        return Err(err);
                    }
                    warn!(
                        pair = %pair,
                        field = field.name,
                        error = %err,
                        "nested mapping failed; left at default"
                    );
                    Resolution::Skip(SkipReason::Failed(err.to_string()))
                }
            };
            fields.push(FieldPlan {
                destination: field.name,
                source: Some(source_field.name),
                resolution,
            });
        }

        Ok(BindingPlan::fields(pair.clone(), constructor, fields))
    }

    /// Source field feeding `destination`: the renamed field when the rename
    /// table names one the source has, otherwise the identically named field.
    fn source_field<'d>(
        &self,
        source: &'d ShapeDescriptor,
        destination: &str,
    ) -> Option<&'d FieldDescriptor> {
        self.renames
            .source_for(destination)
            .and_then(|name| source.find(name))
            .or_else(|| source.find(destination))
    }

    fn resolve(&mut self, source: &ValueType, destination: &ValueType) -> Result<Option<Binding>> {
        if source == destination {
            return Ok(Some(Binding::Identity));
        }

        let pair = ShapePair::new(source.clone(), destination.clone());
        if let Some(converter) = self.registry.get_converter(&pair) {
            return Ok(Some(Binding::Convert(converter)));
        }
        if let Some(existing) = self.lookup(&pair) {
            return Ok(Some(Binding::Nested(existing)));
        }

        if source.is_record() && destination.is_record() {
            if let Some(slot) = self.in_progress.get(&pair) {
                return Ok(Some(Binding::Deferred(slot.clone())));
            }
            return self.compile(&pair).map(|nested| Some(Binding::Nested(nested)));
        }

        self.resolve_container(source, destination)
    }

    fn resolve_container(
        &mut self,
        source: &ValueType,
        destination: &ValueType,
    ) -> Result<Option<Binding>> {
        match (source, destination) {
            (ValueType::List(source), ValueType::List(destination)) => Ok(self
                .resolve(source, destination)?
                .map(|element| Binding::Each(Box::new(element)))),
            (ValueType::Optional(source), ValueType::Optional(destination)) => Ok(self
                .resolve(source, destination)?
                .map(|inner| Binding::Optional(Box::new(inner)))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use remap_model::{Mappable, Value, ValueError, shape};

    use super::*;

    #[derive(Debug, Default)]
    struct Invoice {
        number: i64,
        memo: String,
        lines: Vec<Line>,
    }

    #[derive(Debug, Default)]
    struct Line {
        sku: String,
        quantity: i32,
    }

    #[derive(Debug, Default)]
    struct InvoiceDto {
        lines: Vec<LineDto>,
        number: String,
        note: String,
        total: i64,
    }

    #[derive(Debug, Default)]
    struct LineDto {
        sku: String,
        quantity: i32,
    }

    shape!(Invoice { number: i64, memo: String, lines: Vec<Line> });
    shape!(Line { sku: String, quantity: i32 });
    shape!(InvoiceDto { lines: Vec<LineDto>, number: String, note: String, total: i64 });
    shape!(LineDto { sku: String, quantity: i32 });

    fn compile(
        registry: &mut Registry,
        renames: &FieldRenames,
        policy: UnresolvedFieldPolicy,
    ) -> Result<Transformation> {
        Compiler::new(registry, renames, policy).register(&ShapePair::of::<Invoice, InvoiceDto>())
    }

    #[test]
    fn nested_pairs_are_registered_as_a_side_effect() {
        let mut registry = Registry::new();
        compile(&mut registry, &FieldRenames::new(), UnresolvedFieldPolicy::Skip)
            .expect("compile invoice");

        assert!(registry.contains(&ShapePair::of::<Invoice, InvoiceDto>()));
        assert!(registry.contains(&ShapePair::of::<Line, LineDto>()));
        assert_eq!(registry.len(), 2);

        let summary = registry
            .plan(&ShapePair::of::<Invoice, InvoiceDto>())
            .expect("plan recorded");
        assert_eq!(summary.field("lines").map(|f| f.rule.as_str()), Some("each(nested)"));
        assert_eq!(
            summary.field("number").map(|f| f.rule.as_str()),
            Some("skipped (unresolved)")
        );
        assert_eq!(
            summary.field("total").map(|f| f.rule.as_str()),
            Some("skipped (no source field)")
        );
    }

    #[test]
    fn renames_and_converters_bind_fields() {
        let mut registry = Registry::new();
        registry.set_converter(
            ShapePair::of::<i64, String>(),
            Arc::new(|value: &Value| -> std::result::Result<Value, ValueError> {
                let number = i64::from_value(value.clone())?;
                Ok(Value::Text(format!("INV-{number}")))
            }),
        );
        let renames = FieldRenames::new().rename("note", "memo");
        let transformation = compile(&mut registry, &renames, UnresolvedFieldPolicy::Skip)
            .expect("compile invoice");

        let source = Invoice {
            number: 12,
            memo: "rush".to_string(),
            lines: vec![Line {
                sku: "A-1".to_string(),
                quantity: 3,
            }],
        };
        let mapped = transformation(&source.to_value()).expect("apply");
        let record = mapped.as_record().expect("record");
        assert_eq!(record.get("number"), Some(&Value::Text("INV-12".to_string())));
        assert_eq!(record.get("note"), Some(&Value::Text("rush".to_string())));
        assert_eq!(record.get("total"), Some(&Value::Int(0)));
    }

    #[test]
    fn strict_policy_rejects_unresolved_fields() {
        let mut registry = Registry::new();
        let err = compile(&mut registry, &FieldRenames::new(), UnresolvedFieldPolicy::Strict)
            .err()
            .expect("strict compile fails");
        assert_eq!(
            err,
            MapError::InvalidPropertyMapping {
                shape: "InvoiceDto".to_string(),
                field: "number".to_string(),
                source_type: "i64".to_string(),
                destination_type: "String".to_string(),
            }
        );
        // The line pair compiled before the failing field is not kept either.
        assert!(registry.is_empty());
        assert!(registry.plan(&ShapePair::of::<Line, LineDto>()).is_none());
    }

    #[test]
    fn compiling_twice_returns_the_registered_transformation() {
        let mut registry = Registry::new();
        let first = compile(&mut registry, &FieldRenames::new(), UnresolvedFieldPolicy::Skip)
            .expect("first compile");
        let second = compile(&mut registry, &FieldRenames::new(), UnresolvedFieldPolicy::Skip)
            .expect("second compile");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
    }
}
