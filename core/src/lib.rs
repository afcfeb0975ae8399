//! Core types for declaring typed configuration schemas.
//!
//! This crate defines what a configuration looks like, independent of where
//! its values come from:
//!
//! - [`ConfigSchema`] — a named, ordered set of [`FieldSchema`]s.
//! - [`TypeDescriptor`] — the declared type of a field, as a small type tree
//!   (`int`, `list[float]`, `optional[str]`, enumerations, ...).
//! - [`Value`] — a dynamic configuration value.
//! - [`SchemaPackage`] — a versioned, serializable bundle of schemas.
//!
//! [`classify`] reduces a declared type to a [`TypeCategory`], and
//! [`introspect`] turns a schema into the [`FieldDescriptor`]s an argument
//! grammar is synthesized from. Problems with a declaration are reported as
//! [`SchemaError`]s; values that fail coercion as [`ValueError`]s.
//!
//! # Example
//!
//! ```
//! use config_schema_core::*;
//!
//! let schema = ConfigSchema::new("train")
//!     .with_field(FieldSchema::new("epochs", TypeDescriptor::Int).with_default(3))
//!     .with_field(FieldSchema::new("layers", TypeDescriptor::list(TypeDescriptor::Int)))
//!     .with_field(FieldSchema::new("resume", TypeDescriptor::optional(TypeDescriptor::Str)));
//!
//! let desc = introspect(&schema).unwrap();
//! assert_eq!(desc.fields[1].category, TypeCategory::List(ScalarType::Int));
//! assert!(desc.fields[1].required);
//! assert!(desc.fields[2].nullable);
//! assert_eq!(desc.fields[0].coerce_token("7"), Ok(Value::Int(7)));
//! ```

mod classify;
mod descriptor;
mod error;
mod introspect;
mod package;
mod types;
mod validate;
mod value;

pub use classify::{Classified, classify};
pub use descriptor::{FieldDescriptor, TypeCategory};
pub use error::{SchemaError, ValueError};
pub use introspect::{FixedField, SchemaDescriptor, describe_field, introspect};
pub use package::SchemaPackage;
pub use types::*;
pub use validate::{is_valid_field_name, validate_schema, validate_schemas};
pub use value::{FALSY, TRUTHY, Value, parse_truthy};
