//! Error types for binding operations.
//!
//! Provides a unified error type covering grammar construction, token
//! parsing, value coercion, missing required fields, and document
//! parsing.

use std::path::PathBuf;

use config_schema_core::{SchemaError, ValueError};
use thiserror::Error;

/// A JSON or YAML document that could not be turned into a mapping.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax or structure error.
    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML syntax or structure error.
    #[error("malformed YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed, but its root is not a mapping.
    #[error("document root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    /// A mapping entry holds something no field type can accept.
    #[error("key `{key}`: {reason}")]
    UnsupportedValue { key: String, reason: String },
}

/// Errors that can occur while building a binder or binding an input.
#[derive(Debug, Error)]
pub enum BindError {
    /// The registered schemas cannot be turned into a grammar.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A supplied value failed coercion.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// One or more required fields received no value from any source.
    #[error("the following fields are required: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    /// A document source was malformed. Nothing was bound.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Tokens not claimed by the grammar, in strict mode.
    #[error("unrecognized arguments: {}", .0.join(" "))]
    Unrecognized(Vec<String>),

    /// A flag was not followed by the values its arity demands.
    #[error("argument {flag}: {expected}")]
    ExpectedArgument { flag: String, expected: &'static str },

    /// A value was attached (`--flag=value`) to a flag that takes none.
    #[error("argument {flag}: ignored explicit argument {value:?}")]
    UnexpectedValue { flag: String, value: String },

    /// A response file or document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `-h`/`--help` was given; carries the rendered usage.
    #[error("{0}")]
    HelpRequested(String),

    /// No instance was bound for the requested schema name.
    #[error("no schema named `{0}` is registered")]
    UnknownSchema(String),

    /// A bound instance could not be deserialized into the requested type.
    #[error("cannot materialize `{schema}`: {source}")]
    Materialize {
        schema: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience alias for results with [`BindError`].
pub type Result<T> = std::result::Result<T, BindError>;
