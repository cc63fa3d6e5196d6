// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::builders;
use crate::configurator::{Configurator, ValidationConfigurator};
use crate::descriptor::TypeDescriptor;
use crate::error::{CompileError, ConfigurationError, Result};
use crate::infer::{ElementPredicate, InstanceStrategy, Inferencer, NoElements};
use crate::shape::ShapeResolver;
use crate::spec::{literal_fields, literal_items, Spec, SpecFields};
use crate::state::{CompositeState, StateNode};
use crate::utils::path::join_path;
use crate::value::Value;

/// How literal arrays and empty records compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LiteralContainers {
    /// A literal array or empty record is one scalar holding that value.
    #[default]
    Opaque,
    /// Literal arrays become lists of scalars and empty records become
    /// empty composites.
    Structural,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CompileOptions {
    pub literal_containers: LiteralContainers,
    pub instances: InstanceStrategy,
}

impl CompileOptions {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Compiles configuration trees into state trees.
#[derive(Clone)]
pub struct Compiler {
    options: CompileOptions,
    elements: Rc<dyn ElementPredicate>,
}

/// Create a compiler with default options that recognizes no UI elements.
impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_options(CompileOptions::default())
    }

    pub fn with_options(options: CompileOptions) -> Self {
        Self {
            options,
            elements: Rc::new(NoElements),
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Sets the predicate used to recognize renderable UI elements among
    /// literal values.
    pub fn set_element_predicate(&mut self, predicate: impl ElementPredicate + 'static) {
        self.elements = Rc::new(predicate);
    }

    pub fn set_literal_containers(&mut self, policy: LiteralContainers) {
        self.options.literal_containers = policy;
    }

    pub fn set_instance_strategy(&mut self, strategy: InstanceStrategy) {
        self.options.instances = strategy;
    }

    pub fn inferencer(&self) -> Inferencer<'_> {
        Inferencer::new(self.elements.as_ref(), self.options.instances)
    }

    /// Infers a configurator for a literal spec entry.
    pub fn infer(&self, spec: &Spec) -> Option<Configurator> {
        self.inferencer().infer(spec)
    }

    /// Derives the structural type descriptor of a shape declaration.
    pub fn resolve_shape_type(&self, spec: &Spec) -> Result<TypeDescriptor> {
        let inferencer = self.inferencer();
        ShapeResolver::new(&inferencer).resolve(spec)
    }

    /// [`builders::array_of`] with this compiler's inference settings.
    pub fn array_of(&self, spec: impl Into<Spec>) -> Result<Configurator> {
        builders::array_of_with(&self.inferencer(), spec)
    }

    pub fn object_of(&self, spec: impl Into<Spec>) -> Result<Configurator> {
        builders::object_of_with(&self.inferencer(), spec)
    }

    pub fn one_of<S: Into<Spec>>(&self, specs: impl IntoIterator<Item = S>) -> Result<Configurator> {
        builders::one_of_with(&self.inferencer(), specs)
    }

    pub fn shape_of(&self, spec: impl Into<Spec>) -> Result<Configurator> {
        builders::shape_of_with(&self.inferencer(), spec)
    }

    pub fn exact_shape_of(&self, spec: impl Into<Spec>) -> Result<Configurator> {
        builders::exact_shape_of_with(&self.inferencer(), spec)
    }

    /// Compiles `spec` into a state tree.
    ///
    /// Compilation is all-or-nothing: on error no node is returned.
    pub fn compile(&self, spec: impl Into<Spec>) -> Result<StateNode> {
        let spec = spec.into();
        debug!(
            literal_containers = ?self.options.literal_containers,
            instances = ?self.options.instances,
            "compiling configuration tree"
        );
        let node = self.compile_at(&spec, "/")?;
        debug!(kind = node.kind_name(), "compiled configuration tree");
        Ok(node)
    }

    fn compile_at(&self, spec: &Spec, path: &str) -> Result<StateNode> {
        match spec {
            Spec::Node(node) => Ok(node.clone()),
            Spec::Invalid(_) => Err(CompileError::MissingDefault { path: path.into() }),
            Spec::Scalar(c) if !c.is_usable() => {
                Err(CompileError::MissingDefault { path: path.into() })
            }
            Spec::Scalar(c) => Ok(StateNode::from_configurator(c)),
            Spec::Shape(shape) => self.compile_at(shape.spec(), path),
            Spec::Validation(v) => Err(ConfigurationError::DetachedValidation {
                path: v.path().into(),
            }
            .into()),
            Spec::Sequence(_) | Spec::Record(_) | Spec::Literal(_) => {
                match self.infer_scalar(spec) {
                    Some(c) => Ok(StateNode::from_configurator(&c)),
                    None => self.expand(spec, path),
                }
            }
        }
    }

    fn infer_scalar(&self, spec: &Spec) -> Option<Configurator> {
        let structural = self.options.literal_containers == LiteralContainers::Structural;
        if structural && (spec.is_sequence() || spec.is_empty_record()) {
            return None;
        }
        self.infer(spec)
    }

    fn expand(&self, spec: &Spec, path: &str) -> Result<StateNode> {
        match spec {
            Spec::Sequence(items) => self.compile_list(items, path),
            Spec::Record(fields) => self.compile_record(fields, path),
            Spec::Literal(Value::Array(items)) => self.compile_list(&literal_items(items), path),
            Spec::Literal(Value::Object(fields)) => {
                self.compile_record(&literal_fields(fields), path)
            }
            Spec::Literal(Value::Instance(instance)) => {
                self.compile_record(&literal_fields(&instance.fields), path)
            }
            // Remaining literals are scalars the inferencer always accepts.
            Spec::Literal(value) => Ok(StateNode::from_configurator(
                &builders::any().defaults_to(value.clone()),
            )),
            _ => self.compile_at(spec, path),
        }
    }

    fn compile_list(&self, items: &[Spec], path: &str) -> Result<StateNode> {
        let children = items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.compile_at(item, &join_path(path, &idx.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(StateNode::list(children))
    }

    /// Compiles a record in two phases: data fields first, then validation
    /// fields resolved against the fields compiled so far.
    fn compile_record(&self, fields: &SpecFields, path: &str) -> Result<StateNode> {
        let composite = CompositeState::default();

        let mut validations: Vec<(&Rc<str>, &ValidationConfigurator)> = vec![];
        for (name, child) in fields {
            if let Spec::Validation(v) = child {
                validations.push((name, v));
                continue;
            }
            trace!(field = %name, "compiling record field");
            composite.insert(name.clone(), self.compile_at(child, &join_path(path, name))?);
        }

        // Resolve every path before inserting any validation node.
        let checks = validations
            .into_iter()
            .map(|(name, v)| {
                let target = composite.resolve(v.path())?;
                debug!(field = %name, validates = v.path(), "wiring validation");
                Ok((name.clone(), target))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(StateNode::record(composite, checks))
    }
}

/// Compiles `spec` with a default [`Compiler`].
pub fn config(spec: impl Into<Spec>) -> Result<StateNode> {
    Compiler::default().compile(spec)
}
