//! Argument grammars and multi-source binding for declared configuration
//! schemas.
//!
//! This crate turns [`ConfigSchema`]s from `config-schema-core` into a
//! command-line grammar and binds inputs from several sources into typed
//! [`ConfigInstance`]s. It supports command-line tokens (optionally
//! augmented by a `.args` response file), in-memory mappings, and JSON or
//! YAML documents.
//!
//! # Main entry points
//!
//! - [`ArgumentBinder::builder`] — register schemas and extra arguments, then
//!   build an immutable binder.
//! - [`ArgumentBinder::bind_args`] / [`ArgumentBinder::bind_env_args`] —
//!   bind command-line tokens.
//! - [`ArgumentBinder::bind_mapping`], [`ArgumentBinder::bind_json_file`],
//!   [`ArgumentBinder::bind_yaml_file`] — bind documents.
//! - [`output::format_grammar`] / [`output::format_binding`] — render results.
//!
//! # Example
//!
//! ```
//! use config_schema_bind::ArgumentBinder;
//! use config_schema_core::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Training {
//!     lr: f64,
//!     epochs: i64,
//!     shuffle: bool,
//! }
//!
//! let schema = ConfigSchema::new("training")
//!     .with_field(FieldSchema::new("lr", TypeDescriptor::Float))
//!     .with_field(FieldSchema::new("epochs", TypeDescriptor::Int).with_default(3))
//!     .with_field(FieldSchema::new("shuffle", TypeDescriptor::Bool).with_default(true));
//!
//! let binder = ArgumentBinder::builder()
//!     .schema(schema)
//!     .look_for_args_file(false)
//!     .build()
//!     .unwrap();
//!
//! let binding = binder.bind_args(["--lr", "0.01", "--no_shuffle"]).unwrap();
//! let training: Training = binding.extract("training").unwrap();
//! assert_eq!(training.lr, 0.01);
//! assert_eq!(training.epochs, 3);
//! assert!(!training.shuffle);
//! ```
//!
//! [`ConfigSchema`]: config_schema_core::ConfigSchema

pub mod binder;
pub mod error;
pub mod grammar;
pub mod instance;
pub mod output;
pub mod response_file;
pub mod sources;
mod tokens;

pub use binder::{ArgumentBinder, BinderBuilder, BinderOptions, DEFAULT_PROGRAM};
pub use error::{BindError, ParseError, Result};
pub use grammar::{ArgumentGrammar, ArgumentSpec, FlagMatch, NEGATION_PREFIX, Nargs};
pub use instance::{Binding, ConfigInstance};
pub use response_file::{ARGS_FILE_EXTENSION, args_file_for, augment, current_entry};
pub use sources::{
    Mapping, load_json_mapping, load_package, load_yaml_mapping, mapping_from_json,
    parse_json_mapping, parse_yaml_mapping,
};
