// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compiles declarative application-state configuration trees into typed,
//! mutable state trees.
//!
//! A configuration tree mixes literal values, explicit type declarations
//! built with [`builders`], nested [`shape`] declarations and cross-field
//! [`validates`] references. [`config`] (or a configured [`Compiler`]) turns
//! it into a [`StateNode`] tree: literals get an inferred type with the
//! literal as default, declarations become scalars, sequences become lists
//! and records become composites whose validation fields reference sibling
//! nodes by path.

pub mod builders;
mod compiler;
mod configurator;
mod descriptor;
mod error;
mod infer;
mod number;
mod shape;
mod spec;
mod state;
mod utils;
mod value;

pub use compiler::{config, CompileOptions, Compiler, LiteralContainers};
pub use configurator::{
    Configurator, InvalidConfigurator, RequiredConfigurator, ShapeConfigurator,
    ValidationConfigurator,
};
pub use descriptor::{FieldTypes, Options, Predicate, PrimitiveKind, TypeDescriptor, TypeKind};
pub use error::{CompileError, ConfigurationError, Result};
pub use infer::{ElementPredicate, Inferencer, InstanceStrategy, NoElements};
pub use number::Number;
pub use shape::ShapeResolver;
pub use spec::{Spec, SpecFields};
pub use state::{CompositeState, ListState, ScalarState, StateNode, ValidationState};
pub use value::{Fields, Instance, Value};

/// Declares a nested shape. Compiling it compiles `spec`; resolving its type
/// yields the structural descriptor of `spec`.
pub fn shape(spec: impl Into<Spec>) -> ShapeConfigurator {
    ShapeConfigurator::new(spec)
}

/// References the node at `path`, relative to the record this declaration
/// is a field of.
pub fn validates(path: &str) -> ValidationConfigurator {
    ValidationConfigurator::new(path)
}
