//! Schema introspection.
//!
//! Walks a [`ConfigSchema`] in declaration order and produces the
//! [`FieldDescriptor`]s the grammar synthesizer consumes. Every descriptor
//! carries its owning schema's name so bound values can be routed back
//! without consulting the schema again.

use crate::classify::classify;
use crate::descriptor::FieldDescriptor;
use crate::types::{DefaultValue, FieldSchema};
use crate::validate::validate_schema;
use crate::{ConfigSchema, SchemaError, TypeCategory, Value};

/// A field excluded from construction (`init = false`).
///
/// It never appears in the grammar; instances always take its default.
#[derive(Debug, Clone)]
pub struct FixedField {
    pub name: String,
    pub default: DefaultValue,
}

/// Introspected form of a [`ConfigSchema`].
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub name: String,
    /// Constructible fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Fields excluded from construction.
    pub fixed: Vec<FixedField>,
    /// All field names, in declaration order.
    pub order: Vec<String>,
}

impl SchemaDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fixed_field(&self, name: &str) -> Option<&FixedField> {
        self.fixed.iter().find(|f| f.name == name)
    }

    /// Returns `true` if `name` is one of this schema's fields.
    pub fn claims(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }
}

/// Introspects a schema.
///
/// # Errors
///
/// Returns the first structural ([`validate_schema`]) or type-level problem.
///
/// # Examples
///
/// ```
/// use config_schema_core::*;
///
/// let schema = ConfigSchema::new("example")
///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
///     .with_field(FieldSchema::new("baz", TypeDescriptor::Str).with_default("toto"))
///     .with_field(FieldSchema::new("opt", TypeDescriptor::optional(TypeDescriptor::Float)))
///     .with_field(FieldSchema::new("cache", TypeDescriptor::Str).with_default("/tmp").no_init());
///
/// let desc = introspect(&schema).unwrap();
/// assert_eq!(desc.fields.len(), 3);
/// assert!(desc.fields[0].required);
/// assert!(!desc.fields[1].required);
/// assert_eq!(desc.fields[2].default.as_ref().unwrap().resolve(), Value::None);
/// assert_eq!(desc.order, vec!["foo", "baz", "opt", "cache"]);
/// ```
pub fn introspect(schema: &ConfigSchema) -> Result<SchemaDescriptor, SchemaError> {
    if let Some(err) = validate_schema(schema).into_iter().next() {
        return Err(err);
    }

    let mut fields = Vec::new();
    let mut fixed = Vec::new();
    for field in &schema.fields {
        if field.init {
            fields.push(describe_field(Some(&schema.name), field)?);
        } else {
            let default = field
                .declared_default()
                .ok_or_else(|| SchemaError::MissingInitDefault {
                    field: field.name.clone(),
                })?;
            fixed.push(FixedField {
                name: field.name.clone(),
                default,
            });
        }
    }

    Ok(SchemaDescriptor {
        name: schema.name.clone(),
        fields,
        fixed,
        order: schema.fields.iter().map(|f| f.name.clone()).collect(),
    })
}

/// Classifies one field and resolves its default.
///
/// `owner` is the schema the field belongs to, or `None` for an argument
/// registered outside any schema.
///
/// Literal defaults are conformed to the field type up front, so an enum
/// default given as its literal becomes the member and an `int` default on a
/// `float` field becomes a float.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the type cannot be classified or the literal
/// default does not conform to it.
pub fn describe_field(
    owner: Option<&str>,
    field: &FieldSchema,
) -> Result<FieldDescriptor, SchemaError> {
    let classified = classify(&field.name, &field.ty)?;

    let mut descriptor = FieldDescriptor {
        owner: owner.map(String::from),
        name: field.name.clone(),
        category: classified.category,
        nullable: classified.nullable,
        required: false,
        default: None,
        help: field.help.clone(),
    };

    descriptor.default = match field.declared_default() {
        Some(DefaultValue::Literal(value)) => {
            let conformed = descriptor
                .conform(&value)
                .map_err(|e| SchemaError::InvalidDefault {
                    field: field.name.clone(),
                    reason: e.reason,
                })?;
            Some(DefaultValue::Literal(conformed))
        }
        Some(factory) => Some(factory),
        None if descriptor.nullable => Some(DefaultValue::Literal(Value::None)),
        None => None,
    };
    descriptor.required =
        descriptor.default.is_none() && descriptor.category != TypeCategory::Bool;

    Ok(descriptor)
}
