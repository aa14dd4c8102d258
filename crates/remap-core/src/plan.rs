//! Binding plans and their materialisation into transformations.
//!
//! Compilation happens in two phases. The compiler first decides, for every
//! destination field, how it is produced ([`Binding`]) or why it is left at
//! its default ([`SkipReason`]); the resulting [`BindingPlan`] is then turned
//! into a single closure by [`BindingPlan::into_transformation`].

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use remap_model::{ShapePair, Value, ValueError};
use serde::{Deserialize, Serialize};

use crate::registry::{Converter, TransformFn, Transformation};

/// Late-bound reference to a transformation that is still being compiled.
///
/// Created when the compiler reaches a pair it is already compiling (a
/// self- or mutually-referential shape). The slot is filled once the outer
/// compilation registers its transformation. It holds a weak reference so a
/// transformation that refers to itself does not keep itself alive; the
/// registry keeps every transformation it has stored, including replaced
/// ones, so the reference stays valid for the registry's lifetime.
#[derive(Clone, Default)]
pub struct DeferredSlot(Arc<OnceLock<Weak<TransformFn>>>);

impl DeferredSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(&self, transformation: &Transformation) {
        let _ = self.0.set(Arc::downgrade(transformation));
    }

    pub fn resolve(&self) -> Option<Transformation> {
        self.0.get().and_then(Weak::upgrade)
    }

    pub fn is_filled(&self) -> bool {
        self.0.get().is_some()
    }
}

/// How a destination value is produced from its source value.
#[derive(Clone)]
pub enum Binding {
    /// Same type on both sides: copy.
    Identity,
    /// A registered type converter.
    Convert(Converter),
    /// A registered transformation for a nested shape pair.
    Nested(Transformation),
    /// A nested shape pair whose compilation was in progress.
    Deferred(DeferredSlot),
    /// Element-wise binding between two lists.
    Each(Box<Binding>),
    /// Binding through two optional values; `None` stays `None`.
    Optional(Box<Binding>),
}

impl Binding {
    /// Applies the binding. `Ok(None)` means the destination keeps its
    /// default value.
    pub fn apply(&self, value: &Value) -> Result<Option<Value>, ValueError> {
        match self {
            Self::Identity => Ok(Some(value.clone())),
            Self::Convert(function) | Self::Nested(function) => function(value).map(Some),
            Self::Deferred(slot) => match slot.resolve() {
                Some(transformation) => transformation(value).map(Some),
                None => Ok(None),
            },
            Self::Each(element) => {
                let Value::List(items) = value else {
                    return Ok(None);
                };
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    match element.apply(item)? {
                        Some(value) => mapped.push(value),
                        None => return Ok(None),
                    }
                }
                Ok(Some(Value::List(mapped)))
            }
            Self::Optional(_) if value.is_null() => Ok(Some(Value::Null)),
            Self::Optional(inner) => inner.apply(value),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Identity => "identity".to_string(),
            Self::Convert(_) => "convert".to_string(),
            Self::Nested(_) => "nested".to_string(),
            Self::Deferred(_) => "deferred".to_string(),
            Self::Each(element) => format!("each({})", element.describe()),
            Self::Optional(inner) => format!("optional({})", inner.describe()),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Why a destination field is left at its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Neither a rename entry nor an identically named source field exists.
    NoSourceField,
    /// The types differ and nothing converts between them.
    Unresolved,
    /// Compiling the nested pair failed.
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceField => f.write_str("skipped (no source field)"),
            Self::Unresolved => f.write_str("skipped (unresolved)"),
            Self::Failed(message) => write!(f, "skipped ({message})"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Bind(Binding),
    Skip(SkipReason),
}

impl Resolution {
    fn describe(&self) -> String {
        match self {
            Self::Bind(binding) => binding.describe(),
            Self::Skip(reason) => reason.to_string(),
        }
    }
}

/// Resolution of a single destination field.
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub destination: &'static str,
    pub source: Option<&'static str>,
    pub resolution: Resolution,
}

#[derive(Debug, Clone)]
pub(crate) enum PlanBody {
    /// Source and destination are the same type.
    Identity,
    /// Record to record, field by field, starting from the default instance.
    Fields {
        constructor: fn() -> Value,
        fields: Vec<FieldPlan>,
    },
    /// Container pair bound as a whole, with the destination default as
    /// fallback.
    Whole { binding: Binding, fallback: Value },
    /// Nothing to bind: always the destination default.
    Constant(Value),
}

/// The per-field decisions for one shape pair.
#[derive(Debug, Clone)]
pub struct BindingPlan {
    pair: ShapePair,
    body: PlanBody,
}

impl BindingPlan {
    pub(crate) fn identity(pair: ShapePair) -> Self {
        Self {
            pair,
            body: PlanBody::Identity,
        }
    }

    pub(crate) fn fields(pair: ShapePair, constructor: fn() -> Value, fields: Vec<FieldPlan>) -> Self {
        Self {
            pair,
            body: PlanBody::Fields {
                constructor,
                fields,
            },
        }
    }

    pub(crate) fn whole(pair: ShapePair, binding: Binding, fallback: Value) -> Self {
        Self {
            pair,
            body: PlanBody::Whole { binding, fallback },
        }
    }

    pub(crate) fn constant(pair: ShapePair, value: Value) -> Self {
        Self {
            pair,
            body: PlanBody::Constant(value),
        }
    }

    pub fn summary(&self) -> PlanSummary {
        let (strategy, fields) = match &self.body {
            PlanBody::Identity => ("identity".to_string(), Vec::new()),
            PlanBody::Fields { fields, .. } => (
                "fields".to_string(),
                fields
                    .iter()
                    .map(|field| FieldSummary {
                        destination: field.destination.to_string(),
                        source: field.source.map(str::to_string),
                        rule: field.resolution.describe(),
                    })
                    .collect(),
            ),
            PlanBody::Whole { binding, .. } => (binding.describe(), Vec::new()),
            PlanBody::Constant(_) => ("default value".to_string(), Vec::new()),
        };
        PlanSummary {
            source: self.pair.source.to_string(),
            destination: self.pair.destination.to_string(),
            strategy,
            fields,
        }
    }

    /// Materialises the plan into a transformation closure.
    pub fn into_transformation(self) -> Transformation {
        match self.body {
            PlanBody::Identity => Arc::new(|value: &Value| -> Result<Value, ValueError> {
                Ok(value.clone())
            }),
            PlanBody::Fields {
                constructor,
                fields,
            } => {
                let bound: Vec<(&'static str, &'static str, Binding)> = fields
                    .into_iter()
                    .filter_map(|field| match (field.source, field.resolution) {
                        (Some(source), Resolution::Bind(binding)) => {
                            Some((field.destination, source, binding))
                        }
                        _ => None,
                    })
                    .collect();
                Arc::new(move |value: &Value| -> Result<Value, ValueError> {
                    let mut destination = constructor();
                    let Some(source) = value.as_record() else {
                        return Ok(destination);
                    };
                    if let Some(record) = destination.as_record_mut() {
                        for (field, source_field, binding) in &bound {
                            let Some(input) = source.get(source_field) else {
                                continue;
                            };
                            if let Some(output) = binding.apply(input)? {
                                record.insert(*field, output);
                            }
                        }
                    }
                    Ok(destination)
                })
            }
            PlanBody::Whole { binding, fallback } => {
                Arc::new(move |value: &Value| -> Result<Value, ValueError> {
                    Ok(binding.apply(value)?.unwrap_or_else(|| fallback.clone()))
                })
            }
            PlanBody::Constant(constant) => {
                Arc::new(move |_: &Value| -> Result<Value, ValueError> { Ok(constant.clone()) })
            }
        }
    }
}

/// Serializable description of a compiled plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub source: String,
    pub destination: String,
    /// `fields`, `identity`, `default value`, or the binding of a container
    /// pair.
    pub strategy: String,
    pub fields: Vec<FieldSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub destination: String,
    pub source: Option<String>,
    pub rule: String,
}

impl PlanSummary {
    pub fn field(&self, destination: &str) -> Option<&FieldSummary> {
        self.fields.iter().find(|field| field.destination == destination)
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)?;
        if self.strategy != "fields" {
            return write!(f, "\n  {}", self.strategy);
        }
        for field in &self.fields {
            match &field.source {
                Some(source) => write!(f, "\n  {} <- {}: {}", field.destination, source, field.rule)?,
                None => write!(f, "\n  {}: {}", field.destination, field.rule)?,
            }
        }
        Ok(())
    }
}
