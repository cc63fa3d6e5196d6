// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type inference for literal configuration values.

use serde::{Deserialize, Serialize};

use crate::builders;
use crate::configurator::Configurator;
use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::spec::Spec;
use crate::value::Value;

/// Recognizes renderable UI elements among literal values.
///
/// Element detection belongs to the rendering layer; the inferencer only asks.
pub trait ElementPredicate {
    fn is_renderable_element(&self, value: &Value) -> bool;
}

impl<F> ElementPredicate for F
where
    F: Fn(&Value) -> bool,
{
    fn is_renderable_element(&self, value: &Value) -> bool {
        self(value)
    }
}

/// Recognizes no value as an element.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElements;

impl ElementPredicate for NoElements {
    fn is_renderable_element(&self, _value: &Value) -> bool {
        false
    }
}

/// How class instances are treated when they appear as literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceStrategy {
    /// An instance becomes an `instanceOf(class)` scalar holding the instance.
    #[default]
    InstanceOf,
    /// An instance is treated like a plain record: expanded field by field,
    /// or an `object` scalar when it has no fields.
    Expand,
}

/// Derives a configurator from a literal value.
///
/// Inference is pure: equal inputs always produce equal configurators.
pub struct Inferencer<'a> {
    elements: &'a dyn ElementPredicate,
    instances: InstanceStrategy,
}

impl Default for Inferencer<'static> {
    fn default() -> Self {
        Inferencer::new(&NoElements, InstanceStrategy::default())
    }
}

impl<'a> Inferencer<'a> {
    pub fn new(elements: &'a dyn ElementPredicate, instances: InstanceStrategy) -> Self {
        Self {
            elements,
            instances,
        }
    }

    /// Infers a configurator for a spec entry.
    ///
    /// Returns `None` when the entry is not a literal and has to be expanded
    /// (or is a configurator of some sort already).
    pub fn infer(&self, spec: &Spec) -> Option<Configurator> {
        match spec {
            Spec::Literal(value) => self.infer_value(value),
            Spec::Sequence(_) => spec
                .to_literal()
                .map(|v| required_default(PrimitiveKind::Array, v)),
            Spec::Record(fields) if fields.is_empty() => {
                Some(required_default(PrimitiveKind::Object, Value::new_object()))
            }
            Spec::Record(_)
            | Spec::Node(_)
            | Spec::Invalid(_)
            | Spec::Scalar(_)
            | Spec::Shape(_)
            | Spec::Validation(_) => None,
        }
    }

    pub fn infer_value(&self, value: &Value) -> Option<Configurator> {
        let kind = match value {
            Value::Null => return Some(builders::any()),
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Number(_) => PrimitiveKind::Number,
            Value::String(_) => PrimitiveKind::String,
            Value::Symbol(_) => PrimitiveKind::Symbol,
            Value::Function(_) => PrimitiveKind::Function,
            _ if self.elements.is_renderable_element(value) => PrimitiveKind::Element,
            Value::Array(_) => PrimitiveKind::Array,
            Value::Instance(instance) => match self.instances {
                InstanceStrategy::InstanceOf => {
                    return builders::instance_of(&instance.class)
                        .ok()
                        .map(|c| c.defaults_to(value.clone()));
                }
                InstanceStrategy::Expand if instance.fields.is_empty() => PrimitiveKind::Object,
                InstanceStrategy::Expand => return None,
            },
            Value::Object(fields) if fields.is_empty() => PrimitiveKind::Object,
            Value::Object(_) => return None,
        };
        Some(required_default(kind, value.clone()))
    }
}

fn required_default(kind: PrimitiveKind, value: Value) -> Configurator {
    Configurator::new(TypeDescriptor::primitive(kind).required(), false).defaults_to(value)
}
