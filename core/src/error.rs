//! Error types for schema classification and value coercion.
//!
//! [`SchemaError`] covers declarations that cannot be turned into an argument
//! grammar. These surface once, when a binder is built, and are never
//! recovered from. [`ValueError`] covers a single supplied value that fails
//! coercion to its field's type.

use thiserror::Error;

/// A schema declaration that cannot be classified or synthesized.
///
/// Each variant names the offending schema or field so the message can be
/// shown to whoever wrote the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema name is empty or whitespace-only.
    #[error("schema name cannot be empty")]
    EmptySchemaName,

    /// Two registered schemas share a name.
    #[error("duplicate schema: {0}")]
    DuplicateSchema(String),

    /// Field name is not a valid identifier.
    #[error("invalid field name in schema `{schema}`: {field:?}")]
    InvalidFieldName { schema: String, field: String },

    /// Two fields in the same schema share a name.
    #[error("duplicate field `{field}` in schema `{schema}`")]
    DuplicateField { schema: String, field: String },

    /// The declared type has no category (maps, bare `none`, wide unions).
    #[error("field `{field}`: type `{ty}` is not supported")]
    UnsupportedType { field: String, ty: String },

    /// The declared type refers to a name that was never resolved.
    #[error("field `{field}`: unresolved type reference `{name}`")]
    UnresolvedType { field: String, name: String },

    /// A list whose element types disagree.
    #[error("field `{field}` cannot be a list of mixed types ({ty})")]
    MixedList { field: String, ty: String },

    /// An enumeration that is empty or whose literals disagree with its scalar.
    #[error("field `{field}`: enum `{name}` {reason}")]
    InvalidEnum {
        field: String,
        name: String,
        reason: String,
    },

    /// The declared default does not conform to the declared type.
    #[error("field `{field}`: default does not match its type: {reason}")]
    InvalidDefault { field: String, reason: String },

    /// A field excluded from construction has nothing to be built from.
    #[error("field `{field}` is excluded from init but has no default or factory")]
    MissingInitDefault { field: String },

    /// Two arguments in the combined grammar claim the same option string.
    #[error("conflicting option string: {0}")]
    FlagConflict(String),
}

/// A supplied value that could not be coerced to its field's type.
///
/// # Examples
///
/// ```
/// use config_schema_core::parse_truthy;
///
/// let err = parse_truthy("flag", "maybe").unwrap_err();
/// assert_eq!(err.field, "flag");
/// assert_eq!(err.token, "maybe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value for `{field}`: {token:?} ({reason})")]
pub struct ValueError {
    /// Field (argument destination) the value was supplied for.
    pub field: String,
    /// The offending token, rendered as text.
    pub token: String,
    /// Human-readable explanation.
    pub reason: String,
}

impl ValueError {
    pub(crate) fn new(
        field: impl Into<String>,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            token: token.into(),
            reason: reason.into(),
        }
    }
}
