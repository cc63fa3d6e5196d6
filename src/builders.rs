// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type builders.
//!
//! Every builder returns a fresh [`Configurator`]; nothing is cached or
//! registered at load time. Structural builders take a *spec* rather than a
//! finished descriptor and run it through the [`ShapeResolver`]. The plain
//! forms infer literals with [`Inferencer::default`]; the `_with` forms (and
//! the matching [`Compiler`](crate::Compiler) methods) use the given
//! inferencer, so UI elements and instances are recognized the same way the
//! compiler recognizes them.

use std::rc::Rc;

use crate::configurator::Configurator;
use crate::descriptor::{FieldTypes, Options, Predicate, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::error::{ConfigurationError, Result};
use crate::infer::Inferencer;
use crate::shape::ShapeResolver;
use crate::spec::Spec;
use crate::value::Value;

/// Primitive builders by name.
pub const PRIMITIVES: [(&str, PrimitiveKind); 10] = [
    ("any", PrimitiveKind::Any),
    ("array", PrimitiveKind::Array),
    ("bool", PrimitiveKind::Bool),
    ("element", PrimitiveKind::Element),
    ("function", PrimitiveKind::Function),
    ("node", PrimitiveKind::Node),
    ("number", PrimitiveKind::Number),
    ("object", PrimitiveKind::Object),
    ("string", PrimitiveKind::String),
    ("symbol", PrimitiveKind::Symbol),
];

/// Builders that take no argument besides the primitives.
const SHORTCUTS: [(&str, fn() -> Configurator); 4] = [
    ("email", email),
    ("url", url),
    ("uuid", uuid),
    ("password", password),
];

/// Looks up a nullary builder (primitive or shortcut) by name.
pub fn lookup(name: &str) -> Option<Configurator> {
    PRIMITIVES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kind)| primitive(*kind))
        .or_else(|| {
            SHORTCUTS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, build)| build())
        })
}

pub fn primitive(kind: PrimitiveKind) -> Configurator {
    Configurator::new(TypeDescriptor::primitive(kind), false)
}

pub fn any() -> Configurator {
    primitive(PrimitiveKind::Any)
}

pub fn array() -> Configurator {
    primitive(PrimitiveKind::Array)
}

pub fn bool() -> Configurator {
    primitive(PrimitiveKind::Bool)
}

pub fn element() -> Configurator {
    primitive(PrimitiveKind::Element)
}

pub fn function() -> Configurator {
    primitive(PrimitiveKind::Function)
}

pub fn node() -> Configurator {
    primitive(PrimitiveKind::Node)
}

pub fn number() -> Configurator {
    primitive(PrimitiveKind::Number)
}

pub fn object() -> Configurator {
    primitive(PrimitiveKind::Object)
}

pub fn string() -> Configurator {
    primitive(PrimitiveKind::String)
}

pub fn symbol() -> Configurator {
    primitive(PrimitiveKind::Symbol)
}

/// A value restricted to one of `values`.
pub fn enumeration<V: Into<Value>>(
    values: impl IntoIterator<Item = V>,
) -> Result<Configurator, ConfigurationError> {
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return Err(ConfigurationError::EmptyEnum);
    }
    Ok(Configurator::new(
        TypeDescriptor::new(TypeKind::Enum(Rc::new(values))),
        false,
    ))
}

pub fn instance_of(class: &str) -> Result<Configurator, ConfigurationError> {
    if class.trim().is_empty() {
        return Err(ConfigurationError::EmptyClassName);
    }
    Ok(Configurator::new(
        TypeDescriptor::new(TypeKind::InstanceOf(class.into())),
        false,
    ))
}

/// A value checked by a caller-supplied predicate. Custom types have no
/// required form.
pub fn custom(name: &str, predicate: impl Fn(&Value) -> bool + 'static) -> Configurator {
    Configurator::new(
        TypeDescriptor::new(TypeKind::Custom(Predicate::new(name, predicate))),
        false,
    )
}

fn shortcut(kind: PrimitiveKind, reset_on_disconnect: bool, built_in: &[(&str, Value)]) -> Configurator {
    let options: Options = built_in
        .iter()
        .map(|(k, v)| (Rc::from(*k), v.clone()))
        .collect();
    let descriptor = TypeDescriptor::primitive(kind).with_builtin_options(options);
    Configurator::new(descriptor, reset_on_disconnect)
}

pub fn email() -> Configurator {
    shortcut(PrimitiveKind::String, false, &[("isEmail", Value::Bool(true))])
}

pub fn url() -> Configurator {
    shortcut(PrimitiveKind::String, false, &[("isUrl", Value::Bool(true))])
}

pub fn uuid() -> Configurator {
    shortcut(PrimitiveKind::String, false, &[("isUuid", Value::Bool(true))])
}

/// A string that is cleared when the front end disconnects.
pub fn password() -> Configurator {
    shortcut(PrimitiveKind::String, true, &[])
}

fn resolve(inferencer: &Inferencer<'_>, spec: &Spec) -> Result<TypeDescriptor> {
    ShapeResolver::new(inferencer).resolve(spec)
}

/// An array whose elements are described by `spec`.
pub fn array_of(spec: impl Into<Spec>) -> Result<Configurator> {
    array_of_with(&Inferencer::default(), spec)
}

pub fn array_of_with(inferencer: &Inferencer<'_>, spec: impl Into<Spec>) -> Result<Configurator> {
    let element = resolve(inferencer, &spec.into())?;
    Ok(Configurator::new(TypeDescriptor::array_of(element), false))
}

/// A map from arbitrary keys to values described by `spec`.
pub fn object_of(spec: impl Into<Spec>) -> Result<Configurator> {
    object_of_with(&Inferencer::default(), spec)
}

pub fn object_of_with(inferencer: &Inferencer<'_>, spec: impl Into<Spec>) -> Result<Configurator> {
    let value = resolve(inferencer, &spec.into())?;
    Ok(Configurator::new(TypeDescriptor::object_of(value), false))
}

/// A value matching any of `specs`.
pub fn one_of<S: Into<Spec>>(specs: impl IntoIterator<Item = S>) -> Result<Configurator> {
    one_of_with(&Inferencer::default(), specs)
}

pub fn one_of_with<S: Into<Spec>>(
    inferencer: &Inferencer<'_>,
    specs: impl IntoIterator<Item = S>,
) -> Result<Configurator> {
    let candidates = specs
        .into_iter()
        .map(|s| resolve(inferencer, &s.into()))
        .collect::<Result<Vec<_>>>()?;
    Ok(Configurator::new(TypeDescriptor::one_of(candidates)?, false))
}

/// A record with at least the fields described by `spec`.
pub fn shape_of(spec: impl Into<Spec>) -> Result<Configurator> {
    shape_of_with(&Inferencer::default(), spec)
}

pub fn shape_of_with(inferencer: &Inferencer<'_>, spec: impl Into<Spec>) -> Result<Configurator> {
    let fields = record_fields(inferencer, &spec.into())?;
    Ok(Configurator::new(TypeDescriptor::new(TypeKind::ShapeOf(fields)), false))
}

/// A record with exactly the fields described by `spec`.
pub fn exact_shape_of(spec: impl Into<Spec>) -> Result<Configurator> {
    exact_shape_of_with(&Inferencer::default(), spec)
}

pub fn exact_shape_of_with(
    inferencer: &Inferencer<'_>,
    spec: impl Into<Spec>,
) -> Result<Configurator> {
    let fields = record_fields(inferencer, &spec.into())?;
    Ok(Configurator::new(
        TypeDescriptor::new(TypeKind::ExactShapeOf(fields)),
        false,
    ))
}

fn record_fields(inferencer: &Inferencer<'_>, spec: &Spec) -> Result<Rc<FieldTypes>> {
    let resolved = resolve(inferencer, spec)?;
    match resolved.kind() {
        TypeKind::ExactShapeOf(fields) | TypeKind::ShapeOf(fields) => Ok(fields.clone()),
        // An empty record is inferred as a plain object.
        TypeKind::Primitive(PrimitiveKind::Object) if spec.is_empty_record() => Ok(Rc::default()),
        _ => Err(ConfigurationError::NotARecordShape {
            found: resolved.to_string().into(),
        }
        .into()),
    }
}
