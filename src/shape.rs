// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Derives a type descriptor from a nested shape declaration.

use std::rc::Rc;

use crate::descriptor::{distinct, FieldTypes, PrimitiveKind, TypeDescriptor};
use crate::error::{CompileError, Result};
use crate::infer::Inferencer;
use crate::spec::{literal_fields, literal_items, Spec};
use crate::value::Value;

pub struct ShapeResolver<'a> {
    inferencer: &'a Inferencer<'a>,
}

impl<'a> ShapeResolver<'a> {
    pub fn new(inferencer: &'a Inferencer<'a>) -> Self {
        Self { inferencer }
    }

    /// Resolves the structural type of `spec`.
    ///
    /// Declarations and live state must not be mixed: a compiled state node
    /// anywhere in `spec` is an error.
    pub fn resolve(&self, spec: &Spec) -> Result<TypeDescriptor> {
        match spec {
            Spec::Node(_) => Err(CompileError::ShapeDefinition),
            Spec::Shape(shape) => {
                let t = self.resolve(shape.spec())?;
                Ok(if shape.is_required() && t.supports_required() {
                    t.required()
                } else {
                    t
                })
            }
            Spec::Scalar(c) => Ok(c.descriptor().clone()),
            // Declaring a required field without default is fine in a shape.
            Spec::Invalid(c) => Ok(c.descriptor().clone()),
            Spec::Validation(_) => Ok(TypeDescriptor::validation_marker()),
            Spec::Sequence(items) => self.resolve_sequence(items),
            Spec::Literal(Value::Array(items)) => self.resolve_sequence(&literal_items(items)),
            Spec::Literal(_) | Spec::Record(_) => match self.inferencer.infer(spec) {
                Some(c) => Ok(c.descriptor().clone()),
                None => self.resolve_record(spec),
            },
        }
    }

    /// The element types of a declared sequence are unified: one type when
    /// they all agree, otherwise a union of the distinct types.
    fn resolve_sequence(&self, items: &[Spec]) -> Result<TypeDescriptor> {
        let types = items
            .iter()
            .map(|item| self.resolve(item))
            .collect::<Result<Vec<_>>>()?;
        let element = match types.len() {
            0 => TypeDescriptor::primitive(PrimitiveKind::Any),
            _ => {
                let mut unique = distinct(types);
                if unique.len() == 1 {
                    unique.remove(0)
                } else {
                    TypeDescriptor::one_of(unique)?
                }
            }
        };
        Ok(TypeDescriptor::array_of(element).required())
    }

    fn resolve_record(&self, spec: &Spec) -> Result<TypeDescriptor> {
        let fields = match spec {
            Spec::Record(fields) => self.resolve_fields(fields.iter())?,
            Spec::Literal(Value::Object(fields)) => {
                self.resolve_fields(literal_fields(fields).iter())?
            }
            Spec::Literal(Value::Instance(instance)) => {
                self.resolve_fields(literal_fields(&instance.fields).iter())?
            }
            // Every other literal is inferable.
            _ => FieldTypes::new(),
        };
        Ok(TypeDescriptor::exact_shape_of(fields))
    }

    fn resolve_fields<'s>(
        &self,
        fields: impl Iterator<Item = (&'s Rc<str>, &'s Spec)>,
    ) -> Result<FieldTypes> {
        fields
            .map(|(name, child)| Ok((name.clone(), self.resolve(child)?)))
            .collect()
    }
}
