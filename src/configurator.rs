// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use crate::descriptor::{Options, TypeDescriptor};
use crate::error::ConfigurationError;
use crate::spec::Spec;
use crate::value::Value;

/// An unresolved declaration of a scalar: a type, an optional default and
/// whether the value resets when the front end disconnects.
///
/// Configurators are immutable; every refinement returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configurator {
    descriptor: TypeDescriptor,
    default: Option<Value>,
    reset_on_disconnect: bool,
}

impl Configurator {
    pub fn new(descriptor: TypeDescriptor, reset_on_disconnect: bool) -> Self {
        Self {
            descriptor,
            default: None,
            reset_on_disconnect,
        }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn reset_on_disconnect(&self) -> bool {
        self.reset_on_disconnect
    }

    /// A required configurator without a default cannot become a state node.
    pub fn is_usable(&self) -> bool {
        !self.descriptor.is_required() || self.default.is_some()
    }

    pub fn defaults_to(&self, value: impl Into<Value>) -> Configurator {
        Configurator {
            default: Some(value.into()),
            ..self.clone()
        }
    }

    /// Derives the required form of this configurator.
    ///
    /// Returns `None` for types without a required/optional distinction.
    pub fn required(&self) -> Option<RequiredConfigurator> {
        if !self.descriptor.supports_required() {
            return None;
        }
        let required = Configurator {
            descriptor: self.descriptor.required(),
            ..self.clone()
        };
        Some(if required.default.is_some() {
            RequiredConfigurator::Ready(required)
        } else {
            RequiredConfigurator::Pending(InvalidConfigurator { template: required })
        })
    }

    pub fn with_options(&self, options: &Options) -> Result<Configurator, ConfigurationError> {
        Ok(Configurator {
            descriptor: self.descriptor.with_options(options)?,
            ..self.clone()
        })
    }
}

/// Result of [`Configurator::required`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredConfigurator {
    /// A default was already known; the configurator is usable as is.
    Ready(Configurator),
    /// Still waiting for a default; compiling it fails.
    Pending(InvalidConfigurator),
}

impl RequiredConfigurator {
    pub fn defaults_to(&self, value: impl Into<Value>) -> Configurator {
        match self {
            RequiredConfigurator::Ready(c) => c.defaults_to(value),
            RequiredConfigurator::Pending(invalid) => invalid.defaults_to(value),
        }
    }
}

/// Sentinel for "required type, no default yet".
///
/// It keeps the required template around so that `defaults_to` can still
/// produce a valid configurator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidConfigurator {
    template: Configurator,
}

impl InvalidConfigurator {
    pub(crate) fn new(template: Configurator) -> Self {
        Self { template }
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        self.template.descriptor()
    }

    pub fn defaults_to(&self, value: impl Into<Value>) -> Configurator {
        self.template.defaults_to(value)
    }
}

/// Wraps a nested configuration spec for later shape-type resolution.
#[derive(Debug, Clone)]
pub struct ShapeConfigurator {
    spec: Rc<Spec>,
    required: bool,
}

impl ShapeConfigurator {
    pub fn new(spec: impl Into<Spec>) -> Self {
        Self {
            spec: Rc::new(spec.into()),
            required: false,
        }
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Same spec, required flag set. The receiver is left untouched.
    pub fn required(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            required: true,
        }
    }
}

/// A forward reference to another node of the tree being compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfigurator {
    path: Rc<str>,
}

impl ValidationConfigurator {
    pub fn new(path: &str) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
