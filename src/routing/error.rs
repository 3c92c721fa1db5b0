//! Registration-time errors.
//!
//! Every error in this module is raised while the route table is being
//! assembled. None of them can occur once the dispatcher is serving.

use thiserror::Error;

/// A route template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Templates are absolute; the empty template is the only exception.
    #[error("template '{template}' must start with '/'")]
    NotAbsolute { template: String },

    /// A segment has a stray or unbalanced brace.
    #[error("template '{template}' has a malformed segment '{segment}'")]
    MalformedSegment { template: String, segment: String },

    /// A capture name is empty or not an identifier.
    #[error("template '{template}' has an invalid capture name '{name}'")]
    InvalidCaptureName { template: String, name: String },

    /// The same capture name appears twice.
    #[error("template '{template}' captures '{name}' more than once")]
    DuplicateCapture { template: String, name: String },
}

/// A method was bound twice on the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("method {method} is already bound on resource '{resource}'")]
pub struct DuplicateBindingError {
    pub resource: String,
    pub method: String,
}

/// The resource table is structurally inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Parent links loop back on themselves.
    #[error("resource parent chain is cyclic: {}", chain.join(" -> "))]
    CyclicParent { chain: Vec<String> },

    /// A resource names a parent that was never registered.
    #[error("resource '{resource}' refers to unknown parent '{parent}'")]
    UnknownParent { resource: String, parent: String },

    /// No resource is registered under this name.
    #[error("no resource named '{name}' is registered")]
    UnknownResource { name: String },

    /// Two resources were registered under one name.
    #[error("resource '{name}' is registered more than once")]
    DuplicateResource { name: String },

    /// Not a valid HTTP method token.
    #[error("'{method}' is not a valid HTTP method")]
    InvalidMethod { method: String },
}

/// Any error raised while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    DuplicateBinding(#[from] DuplicateBindingError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for route table assembly.
pub type SetupResult<T> = Result<T, SetupError>;
