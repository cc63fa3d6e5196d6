// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use thiserror::Error;

// Errors stay `Send + Sync` so they convert into `anyhow::Error`.
type String = Arc<str>;

/// Errors raised while compiling a configuration tree or resolving a shape type.
///
/// Every variant aborts the enclosing call; no partially built tree or
/// descriptor is ever returned alongside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A required type reached compilation without a default value.
    #[error("Required state must have a default value: {path}")]
    MissingDefault { path: String },

    /// A validation path does not lead to an already compiled node.
    #[error("Cannot resolve path '{path}': no node at segment '{segment}'")]
    PathResolution { path: String, segment: String },

    /// A compiled state node was used where a type declaration was expected.
    #[error("State nodes are not allowed in shape definitions")]
    ShapeDefinition,

    /// Malformed builder or configuration input.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Malformed input handed to a type builder or to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Option '{option}' is not supported by type '{kind}'")]
    UnsupportedOption { option: String, kind: String },

    #[error("Option '{option}' must be {expected}")]
    InvalidOptionValue { option: String, expected: &'static str },

    #[error("Enum type requires at least one value")]
    EmptyEnum,

    #[error("Instance type requires a class name")]
    EmptyClassName,

    #[error("Union type requires at least one candidate")]
    EmptyUnion,

    #[error("Shape type requires a record, found '{found}'")]
    NotARecordShape { found: String },

    /// `validates(..)` was used somewhere other than as a record field.
    #[error("Validation of '{path}' must be declared as a field of a record")]
    DetachedValidation { path: String },

    #[error("State node at '{path}' is not a scalar")]
    NotAScalar { path: String },
}

pub type Result<T, E = CompileError> = core::result::Result<T, E>;
