// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structural description of the type held by a state node.
//!
//! Descriptors are immutable value objects: every refinement (`required`,
//! `with_options`) returns a new descriptor and children are shared through
//! `Rc`. Descriptors never reference state nodes, so they cannot form cycles.

use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::ConfigurationError;
use crate::value::Value;

type String = Rc<str>;

/// Options attached to a descriptor, e.g. `{isEmail: true}`.
pub type Options = BTreeMap<String, Value>;

/// Field types of a record shape, in declaration order.
pub type FieldTypes = IndexMap<String, TypeDescriptor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    Any,
    Array,
    Bool,
    Element,
    Function,
    Node,
    Number,
    Object,
    String,
    Symbol,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Any => "any",
            PrimitiveKind::Array => "array",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Element => "element",
            PrimitiveKind::Function => "function",
            PrimitiveKind::Node => "node",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Object => "object",
            PrimitiveKind::String => "string",
            PrimitiveKind::Symbol => "symbol",
        }
    }
}

/// A named, caller-supplied validity check for `custom` types.
///
/// Two predicates are equal only when they share the same closure.
#[derive(Clone)]
pub struct Predicate {
    name: String,
    check: Rc<dyn Fn(&Value) -> bool>,
}

impl Predicate {
    pub fn new(name: &str, check: impl Fn(&Value) -> bool + 'static) -> Self {
        Self {
            name: name.into(),
            check: Rc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.check, &other.check)
    }
}

impl Eq for Predicate {}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Enum(Rc<Vec<Value>>),
    InstanceOf(String),
    Custom(Predicate),
    ArrayOf(Rc<TypeDescriptor>),
    ObjectOf(Rc<TypeDescriptor>),
    OneOf(Rc<Vec<TypeDescriptor>>),
    ShapeOf(Rc<FieldTypes>),
    ExactShapeOf(Rc<FieldTypes>),
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Primitive(p) => p.name(),
            TypeKind::Enum(_) => "enum",
            TypeKind::InstanceOf(_) => "instanceOf",
            TypeKind::Custom(_) => "custom",
            TypeKind::ArrayOf(_) => "arrayOf",
            TypeKind::ObjectOf(_) => "objectOf",
            TypeKind::OneOf(_) => "oneOf",
            TypeKind::ShapeOf(_) => "shapeOf",
            TypeKind::ExactShapeOf(_) => "exactShapeOf",
        }
    }
}

/// What an option value must look like.
#[derive(Clone, Copy)]
enum OptionValue {
    Flag,
    Count,
    Number,
    Text,
}

impl OptionValue {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (OptionValue::Flag, Value::Bool(_)) => true,
            (OptionValue::Count, Value::Number(n)) => n.as_u64().is_some(),
            (OptionValue::Number, Value::Number(_)) => true,
            (OptionValue::Text, Value::String(_)) => true,
            _ => false,
        }
    }

    fn expected(self) -> &'static str {
        match self {
            OptionValue::Flag => "a boolean",
            OptionValue::Count => "a non-negative integer",
            OptionValue::Number => "a number",
            OptionValue::Text => "a string",
        }
    }
}

const COMMON_OPTIONS: &[(&str, OptionValue)] = &[("description", OptionValue::Text)];

const STRING_OPTIONS: &[(&str, OptionValue)] = &[
    ("isEmail", OptionValue::Flag),
    ("isUrl", OptionValue::Flag),
    ("isUuid", OptionValue::Flag),
    ("minLength", OptionValue::Count),
    ("maxLength", OptionValue::Count),
    ("pattern", OptionValue::Text),
];

const NUMBER_OPTIONS: &[(&str, OptionValue)] = &[
    ("minimum", OptionValue::Number),
    ("maximum", OptionValue::Number),
    ("isInteger", OptionValue::Flag),
];

const ARRAY_OPTIONS: &[(&str, OptionValue)] = &[
    ("minItems", OptionValue::Count),
    ("maxItems", OptionValue::Count),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    kind: TypeKind,
    required: bool,
    options: Rc<Options>,
}

impl TypeDescriptor {
    /// Creates an optional descriptor with no options.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            required: false,
            options: Rc::default(),
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(TypeKind::Primitive(kind))
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::ArrayOf(Rc::new(element)))
    }

    pub fn object_of(value: TypeDescriptor) -> Self {
        Self::new(TypeKind::ObjectOf(Rc::new(value)))
    }

    /// Union over `candidates`, keeping the first occurrence of duplicates.
    pub fn one_of(candidates: Vec<TypeDescriptor>) -> Result<Self, ConfigurationError> {
        if candidates.is_empty() {
            return Err(ConfigurationError::EmptyUnion);
        }
        Ok(Self::new(TypeKind::OneOf(Rc::new(distinct(candidates)))))
    }

    pub fn shape_of(fields: FieldTypes) -> Self {
        Self::new(TypeKind::ShapeOf(Rc::new(fields)))
    }

    pub fn exact_shape_of(fields: FieldTypes) -> Self {
        Self::new(TypeKind::ExactShapeOf(Rc::new(fields)))
    }

    /// The placeholder type of a validation entry inside a shape declaration.
    /// Validation entries contribute no data, so this is never a value type.
    pub fn validation_marker() -> Self {
        Self::primitive(PrimitiveKind::Symbol)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Custom validators have no required/optional distinction.
    pub fn supports_required(&self) -> bool {
        !matches!(self.kind, TypeKind::Custom(_))
    }

    /// The required variant of this descriptor. `self` is left untouched.
    pub fn required(&self) -> Self {
        Self {
            required: true,
            ..self.clone()
        }
    }

    pub fn optional(&self) -> Self {
        Self {
            required: false,
            ..self.clone()
        }
    }

    /// Merges `options` into this descriptor's options.
    ///
    /// Options already present win on key conflict, which keeps the built-in
    /// options of shortcut types such as `email` intact.
    pub fn with_options(&self, options: &Options) -> Result<Self, ConfigurationError> {
        let mut merged = self.options.as_ref().clone();
        for (key, value) in options {
            let Some(expected) = self.option_spec(key) else {
                return Err(ConfigurationError::UnsupportedOption {
                    option: key.as_ref().into(),
                    kind: self.kind.name().into(),
                });
            };
            if !expected.accepts(value) {
                return Err(ConfigurationError::InvalidOptionValue {
                    option: key.as_ref().into(),
                    expected: expected.expected(),
                });
            }
            merged.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Ok(Self {
            options: Rc::new(merged),
            ..self.clone()
        })
    }

    /// Replaces the options with a built-in set that is known to be valid
    /// for this kind.
    pub(crate) fn with_builtin_options(&self, options: Options) -> Self {
        debug_assert!(
            options
                .iter()
                .all(|(key, value)| self.option_spec(key).is_some_and(|o| o.accepts(value))),
            "invalid built-in options for {}",
            self.kind.name()
        );
        Self {
            options: Rc::new(options),
            ..self.clone()
        }
    }

    fn option_spec(&self, key: &str) -> Option<OptionValue> {
        let specific: &[(&str, OptionValue)] = match &self.kind {
            TypeKind::Primitive(PrimitiveKind::String) => STRING_OPTIONS,
            TypeKind::Primitive(PrimitiveKind::Number) => NUMBER_OPTIONS,
            TypeKind::Primitive(PrimitiveKind::Array) | TypeKind::ArrayOf(_) => ARRAY_OPTIONS,
            _ => &[],
        };
        COMMON_OPTIONS
            .iter()
            .chain(specific)
            .find(|(name, _)| *name == key)
            .map(|(_, v)| *v)
    }
}

/// Removes duplicates while keeping first-occurrence order.
pub(crate) fn distinct(types: Vec<TypeDescriptor>) -> Vec<TypeDescriptor> {
    let mut unique: Vec<TypeDescriptor> = Vec::with_capacity(types.len());
    for t in types {
        if !unique.contains(&t) {
            unique.push(t);
        }
    }
    unique
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "required ")?;
        }
        match &self.kind {
            TypeKind::Primitive(p) => write!(f, "{}", p.name())?,
            TypeKind::Enum(values) => {
                write!(f, "enum(")?;
                for (idx, v) in values.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")?;
            }
            TypeKind::InstanceOf(class) => write!(f, "instanceOf({class})")?,
            TypeKind::Custom(p) => write!(f, "custom({})", p.name())?,
            TypeKind::ArrayOf(t) => write!(f, "arrayOf({t})")?,
            TypeKind::ObjectOf(t) => write!(f, "objectOf({t})")?,
            TypeKind::OneOf(candidates) => {
                write!(f, "oneOf(")?;
                for (idx, t) in candidates.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")?;
            }
            TypeKind::ShapeOf(fields) | TypeKind::ExactShapeOf(fields) => {
                write!(f, "{}{{", self.kind.name())?;
                for (idx, (name, t)) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {t}")?;
                }
                write!(f, "}}")?;
            }
        }
        Ok(())
    }
}
