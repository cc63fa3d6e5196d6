// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compiled state nodes.
//!
//! A state tree is made of scalars (one mutable value slot), lists,
//! composites and validation nodes. Parents own their children through `Rc`;
//! a validation node only holds a `Weak` reference to the node it validates,
//! so the ownership graph stays a tree.

use core::cell::{Ref, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::configurator::Configurator;
use crate::descriptor::TypeDescriptor;
use crate::error::{CompileError, ConfigurationError, Result};
use crate::utils::path::{parse_state_path, PathSegment};
use crate::value::{Fields, Value};

/// Handle to a compiled state node. Cloning the handle does not copy the
/// node; equality is identity.
#[derive(Clone)]
pub struct StateNode(Rc<NodeData>);

enum NodeData {
    Scalar(ScalarState),
    List(ListState),
    Composite(CompositeState),
    Validation(ValidationState),
}

pub struct ScalarState {
    descriptor: TypeDescriptor,
    default: Option<Value>,
    reset_on_disconnect: bool,
    value: RefCell<Value>,
}

impl ScalarState {
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn reset_on_disconnect(&self) -> bool {
        self.reset_on_disconnect
    }

    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn set(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }

    /// Restores the default value, or `Null` when there is none.
    pub fn reset(&self) {
        self.set(self.default.clone().unwrap_or(Value::Null));
    }
}

#[derive(Default)]
pub struct ListState {
    items: RefCell<Vec<StateNode>>,
}

impl ListState {
    pub fn get(&self, index: usize) -> Option<StateNode> {
        self.items.borrow().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<StateNode>> {
        self.items.borrow()
    }
}

#[derive(Default)]
pub struct CompositeState {
    fields: RefCell<IndexMap<Rc<str>, StateNode>>,
}

impl CompositeState {
    pub fn insert(&self, name: Rc<str>, node: StateNode) {
        self.fields.borrow_mut().insert(name, node);
    }

    pub fn get(&self, name: &str) -> Option<StateNode> {
        self.fields.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> Vec<Rc<str>> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn fields(&self) -> Ref<'_, IndexMap<Rc<str>, StateNode>> {
        self.fields.borrow()
    }

    /// Resolves `path` against the fields of this composite. `None` stands
    /// for the composite itself, named by the empty path.
    pub fn resolve(&self, path: &str) -> Result<Option<StateNode>> {
        let segments = parse_state_path(path);
        let Some((first, rest)) = segments.split_first() else {
            return Ok(None);
        };
        let field = self
            .get(first.as_str())
            .ok_or_else(|| unresolved(path, first.as_str()))?;
        walk(field, rest, path).map(Some)
    }
}

fn unresolved(path: &str, segment: &str) -> CompileError {
    CompileError::PathResolution {
        path: path.into(),
        segment: segment.into(),
    }
}

fn walk(mut node: StateNode, segments: &[PathSegment<'_>], path: &str) -> Result<StateNode> {
    for segment in segments {
        node = node
            .child(segment.as_str())
            .ok_or_else(|| unresolved(path, segment.as_str()))?;
    }
    Ok(node)
}

pub struct ValidationState {
    target: Weak<NodeData>,
}

impl ValidationState {
    /// The validated node, unless the tree owning it has been dropped.
    pub fn target(&self) -> Option<StateNode> {
        self.target.upgrade().map(StateNode)
    }
}

impl From<CompositeState> for StateNode {
    fn from(composite: CompositeState) -> Self {
        StateNode(Rc::new(NodeData::Composite(composite)))
    }
}

impl StateNode {
    /// Wraps `composite` into a node, then appends one validation field per
    /// entry of `checks`. A check without a target validates the new node.
    pub fn record(composite: CompositeState, checks: Vec<(Rc<str>, Option<StateNode>)>) -> Self {
        StateNode(Rc::new_cyclic(|this| {
            for (name, target) in checks {
                let check = match target {
                    Some(node) => StateNode::validation(&node),
                    None => StateNode::validation_of(this.clone()),
                };
                composite.insert(name, check);
            }
            NodeData::Composite(composite)
        }))
    }
}

impl StateNode {
    pub fn scalar(descriptor: TypeDescriptor, default: Option<Value>, reset_on_disconnect: bool) -> Self {
        let value = RefCell::new(default.clone().unwrap_or(Value::Null));
        StateNode(Rc::new(NodeData::Scalar(ScalarState {
            descriptor,
            default,
            reset_on_disconnect,
            value,
        })))
    }

    pub fn from_configurator(c: &Configurator) -> Self {
        Self::scalar(
            c.descriptor().clone(),
            c.default_value().cloned(),
            c.reset_on_disconnect(),
        )
    }

    pub fn list(items: Vec<StateNode>) -> Self {
        StateNode(Rc::new(NodeData::List(ListState {
            items: RefCell::new(items),
        })))
    }

    pub fn composite() -> Self {
        Self::from(CompositeState::default())
    }

    pub fn validation(target: &StateNode) -> Self {
        Self::validation_of(Rc::downgrade(&target.0))
    }

    fn validation_of(target: Weak<NodeData>) -> Self {
        StateNode(Rc::new(NodeData::Validation(ValidationState { target })))
    }

    pub fn as_scalar(&self) -> Option<&ScalarState> {
        match self.0.as_ref() {
            NodeData::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListState> {
        match self.0.as_ref() {
            NodeData::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeState> {
        match self.0.as_ref() {
            NodeData::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationState> {
        match self.0.as_ref() {
            NodeData::Validation(v) => Some(v),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.0.as_ref() {
            NodeData::Scalar(_) => "scalar",
            NodeData::List(_) => "list",
            NodeData::Composite(_) => "composite",
            NodeData::Validation(_) => "validation",
        }
    }

    pub fn ptr_eq(&self, other: &StateNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Snapshot of the data held by this node and its descendants.
    ///
    /// Validation nodes carry no data: they read as `Null` and are left out
    /// of their parent composite's value.
    pub fn value(&self) -> Value {
        match self.0.as_ref() {
            NodeData::Scalar(s) => s.value(),
            NodeData::List(l) => Value::from(l.items().iter().map(StateNode::value).collect::<Vec<_>>()),
            NodeData::Composite(c) => {
                let fields: Fields = c
                    .fields()
                    .iter()
                    .filter(|(_, node)| node.as_validation().is_none())
                    .map(|(name, node)| (name.clone(), node.value()))
                    .collect();
                Value::from(fields)
            }
            NodeData::Validation(_) => Value::Null,
        }
    }

    /// Direct child named by one path segment.
    pub fn child(&self, segment: &str) -> Option<StateNode> {
        match self.0.as_ref() {
            NodeData::Composite(c) => c.get(segment),
            NodeData::List(l) => PathSegment(segment)
                .as_index()
                .and_then(|idx| l.get(idx)),
            NodeData::Scalar(_) | NodeData::Validation(_) => None,
        }
    }

    /// Walks a slash-delimited path ("a/b/0/c") from this node.
    pub fn find(&self, path: &str) -> Result<StateNode> {
        walk(self.clone(), &parse_state_path(path), path)
    }

    /// Sets the value of the scalar at `path`.
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let node = self.find(path)?;
        match node.as_scalar() {
            Some(s) => {
                s.set(value.into());
                Ok(())
            }
            None => Err(ConfigurationError::NotAScalar { path: path.into() }.into()),
        }
    }

    /// Restores every scalar under this node to its default.
    pub fn reset(&self) {
        self.for_each_scalar(&|s| s.reset());
    }

    /// Resets the scalars configured to reset when the front end disconnects.
    pub fn disconnect(&self) {
        self.for_each_scalar(&|s| {
            if s.reset_on_disconnect() {
                s.reset();
            }
        });
    }

    fn for_each_scalar(&self, f: &dyn Fn(&ScalarState)) {
        match self.0.as_ref() {
            NodeData::Scalar(s) => f(s),
            NodeData::List(l) => l.items().iter().for_each(|n| n.for_each_scalar(f)),
            NodeData::Composite(c) => c.fields().values().for_each(|n| n.for_each_scalar(f)),
            // Targets are reached through their owning parent.
            NodeData::Validation(_) => {}
        }
    }
}

impl PartialEq for StateNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for StateNode {}

impl fmt::Debug for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            NodeData::Scalar(s) => f
                .debug_struct("Scalar")
                .field("type", &format_args!("{}", s.descriptor))
                .field("value", &*s.value.borrow())
                .finish(),
            NodeData::List(l) => f.debug_list().entries(l.items().iter()).finish(),
            NodeData::Composite(c) => f.debug_map().entries(c.fields().iter()).finish(),
            NodeData::Validation(v) => f
                .debug_struct("Validation")
                .field("target", &v.target().map(|t| t.kind_name()))
                .finish(),
        }
    }
}
