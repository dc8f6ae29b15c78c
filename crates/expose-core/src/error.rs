//! Error types for expose

use thiserror::Error;

/// Malformed JSON input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("JSON parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// 1-based line of the failure
    pub line: usize,
    /// 1-based column of the failure
    pub column: usize,
    /// Description from the parser
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        ParseError {
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// Errors raised by the reflection tree
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// A member with this name is already declared
    #[error("Property already exists: {name}")]
    DuplicateProperty {
        /// Colliding name
        name: String,
    },

    /// No member with this name or path
    #[error("Unknown property: {path}")]
    UnknownProperty {
        /// Requested name or dotted path
        path: String,
    },

    /// The member exists but stores another native type
    #[error("Type mismatch for {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Requested name or dotted path
        path: String,
        /// Requested type name
        expected: String,
        /// Stored type name
        actual: String,
    },

    /// The value could not be represented in the target type
    #[error("Cannot convert value for {path} to {target}")]
    Conversion {
        /// Name or dotted path being written
        path: String,
        /// Target type name
        target: String,
    },
}

/// Errors raised by the component registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// No registered component matches name and version requirement
    #[error("Component not found: {name} ({requirement})")]
    NotFound {
        /// Component name
        name: String,
        /// Version requirement that was not satisfied
        requirement: String,
    },

    /// Version or version requirement text could not be parsed
    #[error("Invalid version '{text}': {message}")]
    InvalidVersion {
        /// Offending text
        text: String,
        /// Parser message
        message: String,
    },

    /// A component with the same name and version is already registered
    #[error("Component already registered: {name} {version}")]
    Duplicate {
        /// Component name
        name: String,
        /// Component version
        version: String,
    },
}
