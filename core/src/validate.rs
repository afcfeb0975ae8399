//! Structural schema validation.
//!
//! Catches declarations that would produce an ambiguous or unusable
//! grammar: empty schema names, field names that cannot be spelled as a
//! long flag, duplicate fields, and duplicate schemas. Type-level problems
//! are reported by the [classifier](crate::classify).
//!
//! # Examples
//!
//! ```
//! use config_schema_core::*;
//!
//! let schema = ConfigSchema::new("train")
//!     .with_field(FieldSchema::new("lr", TypeDescriptor::Float));
//! assert!(validate_schema(&schema).is_empty());
//!
//! let bad = ConfigSchema::new("train")
//!     .with_field(FieldSchema::new("learning-rate", TypeDescriptor::Float));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::{ConfigSchema, SchemaError};

static FIELD_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex must compile")
});

/// Returns `true` if `name` can be used as a field name.
pub fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

/// Validates a single schema.
///
/// Returns every problem found, in declaration order.
pub fn validate_schema(schema: &ConfigSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(SchemaError::EmptySchemaName);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for field in &schema.fields {
        if !is_valid_field_name(&field.name) {
            errors.push(SchemaError::InvalidFieldName {
                schema: schema.name.clone(),
                field: field.name.clone(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            errors.push(SchemaError::DuplicateField {
                schema: schema.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    errors
}

/// Validates a set of schemas registered together.
///
/// Stops at the first schema with problems, mirroring how registration
/// fails.
///
/// # Examples
///
/// ```
/// use config_schema_core::*;
///
/// let a = ConfigSchema::new("model");
/// let b = ConfigSchema::new("model");
/// let errors = validate_schemas(&[a, b]);
/// assert_eq!(errors, vec![SchemaError::DuplicateSchema("model".into())]);
/// ```
pub fn validate_schemas(schemas: &[ConfigSchema]) -> Vec<SchemaError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for schema in schemas {
        if !seen.insert(schema.name.as_str()) {
            return vec![SchemaError::DuplicateSchema(schema.name.clone())];
        }
        let errors = validate_schema(schema);
        if !errors.is_empty() {
            return errors;
        }
    }
    Vec::new()
}
