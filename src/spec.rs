// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::configurator::*;
use crate::state::StateNode;
use crate::value::{Fields, Value};

/// Entries of a record spec, in declaration order.
pub type SpecFields = IndexMap<Rc<str>, Spec>;

/// One entry of a configuration tree.
///
/// Every shape a configuration entry can take is a variant here, so the
/// compiler and the shape resolver match exhaustively instead of probing.
#[derive(Debug, Clone)]
pub enum Spec {
    /// An already compiled state node.
    Node(StateNode),
    /// A required type still waiting for its default.
    Invalid(InvalidConfigurator),
    Scalar(Configurator),
    Shape(ShapeConfigurator),
    Validation(ValidationConfigurator),
    Sequence(Vec<Spec>),
    Record(SpecFields),
    Literal(Value),
}

impl Spec {
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Spec
    where
        K: Into<Rc<str>>,
        V: Into<Spec>,
    {
        Spec::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn sequence<V: Into<Spec>>(items: impl IntoIterator<Item = V>) -> Spec {
        Spec::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Converts a spec made only of literals back into a plain value.
    ///
    /// Returns `None` as soon as any configurator, shape, validation or state
    /// node is found, at any depth.
    pub fn to_literal(&self) -> Option<Value> {
        match self {
            Spec::Literal(v) => Some(v.clone()),
            Spec::Sequence(items) => items
                .iter()
                .map(Spec::to_literal)
                .collect::<Option<Vec<_>>>()
                .map(Value::from),
            Spec::Record(fields) => fields
                .iter()
                .map(|(k, v)| v.to_literal().map(|v| (k.clone(), v)))
                .collect::<Option<Fields>>()
                .map(Value::from),
            Spec::Node(_)
            | Spec::Invalid(_)
            | Spec::Scalar(_)
            | Spec::Shape(_)
            | Spec::Validation(_) => None,
        }
    }

    /// Whether this spec is a sequence, literal or not.
    pub fn is_sequence(&self) -> bool {
        matches!(self, Spec::Sequence(_) | Spec::Literal(Value::Array(_)))
    }

    /// Whether this spec is a record without fields, literal or not.
    pub fn is_empty_record(&self) -> bool {
        match self {
            Spec::Record(fields) => fields.is_empty(),
            Spec::Literal(v) => v.is_empty_object(),
            _ => false,
        }
    }
}

/// Lifts a literal array into a sequence of literal specs.
pub(crate) fn literal_items(items: &[Value]) -> Vec<Spec> {
    items.iter().cloned().map(Spec::Literal).collect()
}

/// Lifts a literal record into a record of literal specs.
pub(crate) fn literal_fields(fields: &Fields) -> SpecFields {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), Spec::Literal(v.clone())))
        .collect()
}

impl From<Configurator> for Spec {
    /// A required configurator without default degrades to the invalid sentinel.
    fn from(c: Configurator) -> Self {
        if c.is_usable() {
            Spec::Scalar(c)
        } else {
            Spec::Invalid(InvalidConfigurator::new(c))
        }
    }
}

impl From<RequiredConfigurator> for Spec {
    fn from(c: RequiredConfigurator) -> Self {
        match c {
            RequiredConfigurator::Ready(c) => Spec::from(c),
            RequiredConfigurator::Pending(invalid) => Spec::Invalid(invalid),
        }
    }
}

impl From<InvalidConfigurator> for Spec {
    fn from(c: InvalidConfigurator) -> Self {
        Spec::Invalid(c)
    }
}

impl From<ShapeConfigurator> for Spec {
    fn from(c: ShapeConfigurator) -> Self {
        Spec::Shape(c)
    }
}

impl From<ValidationConfigurator> for Spec {
    fn from(c: ValidationConfigurator) -> Self {
        Spec::Validation(c)
    }
}

impl From<StateNode> for Spec {
    fn from(node: StateNode) -> Self {
        Spec::Node(node)
    }
}

impl From<&StateNode> for Spec {
    fn from(node: &StateNode) -> Self {
        Spec::Node(node.clone())
    }
}

impl From<Vec<Spec>> for Spec {
    fn from(items: Vec<Spec>) -> Self {
        Spec::Sequence(items)
    }
}

impl From<SpecFields> for Spec {
    fn from(fields: SpecFields) -> Self {
        Spec::Record(fields)
    }
}

impl From<Value> for Spec {
    fn from(v: Value) -> Self {
        Spec::Literal(v)
    }
}

impl From<bool> for Spec {
    fn from(b: bool) -> Self {
        Spec::Literal(Value::from(b))
    }
}

impl From<i64> for Spec {
    fn from(n: i64) -> Self {
        Spec::Literal(Value::from(n))
    }
}

impl From<i32> for Spec {
    fn from(n: i32) -> Self {
        Spec::Literal(Value::from(n))
    }
}

impl From<f64> for Spec {
    fn from(n: f64) -> Self {
        Spec::Literal(Value::from(n))
    }
}

impl From<&str> for Spec {
    fn from(s: &str) -> Self {
        Spec::Literal(Value::from(s))
    }
}

impl From<String> for Spec {
    fn from(s: String) -> Self {
        Spec::Literal(Value::from(s))
    }
}
