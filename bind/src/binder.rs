//! The multi-source binder.
//!
//! An [`ArgumentBinder`] owns the introspected schemas and their combined
//! [`ArgumentGrammar`]. Both are built once by [`BinderBuilder::build`] and
//! never mutated, so one binder can serve any number of bind calls, from
//! any number of threads.
//!
//! Every source produces a [`Binding`]:
//!
//! - **tokens** ([`bind_args`](ArgumentBinder::bind_args),
//!   [`bind_env_args`](ArgumentBinder::bind_env_args)) are parsed against the
//!   grammar after optional response-file augmentation;
//! - **mappings** ([`bind_mapping`](ArgumentBinder::bind_mapping)) are
//!   conformed field by field, ignoring unknown keys;
//! - **JSON/YAML** documents are parsed into a mapping first.
//!
//! Missing required fields are collected across all schemas and reported
//! together as [`BindError::MissingRequired`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config_schema_core::{
    ConfigSchema, FieldDescriptor, FieldSchema, SchemaDescriptor, SchemaError, Value,
    describe_field, introspect, validate_schemas,
};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{BindError, Result};
use crate::grammar::ArgumentGrammar;
use crate::instance::{Binding, ConfigInstance};
use crate::response_file::{augment, current_entry};
use crate::sources::{
    Mapping, load_json_mapping, load_yaml_mapping, parse_json_mapping, parse_yaml_mapping,
};
use crate::tokens::parse_tokens;

/// Program name used in usage text when none is configured.
pub const DEFAULT_PROGRAM: &str = "program";

/// Options controlling token binding.
#[derive(Debug, Clone)]
pub struct BinderOptions {
    /// Return unclaimed tokens as leftovers instead of failing.
    pub lenient: bool,
    /// Prepend tokens from the entry point's `.args` file.
    pub look_for_args_file: bool,
    /// Entry point whose `.args` file is read; defaults to `argv[0]`.
    pub entry_point: Option<PathBuf>,
    /// Recognize `-h`/`--help`.
    pub add_help: bool,
    /// Program name shown in usage text.
    pub program: Option<String>,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            lenient: false,
            look_for_args_file: true,
            entry_point: None,
            add_help: true,
            program: None,
        }
    }
}

/// Builder for [`ArgumentBinder`].
///
/// # Examples
///
/// ```
/// use config_schema_bind::ArgumentBinder;
/// use config_schema_core::*;
///
/// let binder = ArgumentBinder::builder()
///     .schema(ConfigSchema::new("model").with_field(FieldSchema::new("foo", TypeDescriptor::Int)))
///     .argument(FieldSchema::new("seed", TypeDescriptor::Int).with_default(0))
///     .lenient(true)
///     .look_for_args_file(false)
///     .build()
///     .unwrap();
///
/// let binding = binder.bind_args(["--foo", "1", "--seed", "7", "extra"]).unwrap();
/// assert_eq!(binding.instances[0].get("foo"), Some(&Value::Int(1)));
/// assert_eq!(binding.leftover_fields["seed"], Value::Int(7));
/// assert_eq!(binding.leftover_tokens, vec!["extra"]);
/// ```
#[derive(Debug, Default)]
pub struct BinderBuilder {
    schemas: Vec<ConfigSchema>,
    extras: Vec<FieldSchema>,
    options: BinderOptions,
}

impl BinderBuilder {
    /// Registers a schema. Instances are produced in registration order.
    pub fn schema(mut self, schema: ConfigSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn schemas(mut self, schemas: impl IntoIterator<Item = ConfigSchema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Registers an argument that belongs to no schema.
    ///
    /// Its value is reported in [`Binding::leftover_fields`].
    pub fn argument(mut self, field: FieldSchema) -> Self {
        self.extras.push(field);
        self
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.options.lenient = lenient;
        self
    }

    pub fn look_for_args_file(mut self, enabled: bool) -> Self {
        self.options.look_for_args_file = enabled;
        self
    }

    pub fn entry_point(mut self, entry: impl Into<PathBuf>) -> Self {
        self.options.entry_point = Some(entry.into());
        self
    }

    pub fn add_help(mut self, enabled: bool) -> Self {
        self.options.add_help = enabled;
        self
    }

    pub fn program(mut self, name: &str) -> Self {
        self.options.program = Some(name.to_string());
        self
    }

    /// Introspects the schemas and synthesizes the combined grammar.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Schema`] for any declaration problem: invalid or
    /// duplicate names, unclassifiable types, bad defaults, or flag
    /// conflicts across schemas.
    pub fn build(self) -> Result<ArgumentBinder> {
        if let Some(err) = validate_schemas(&self.schemas).into_iter().next() {
            return Err(err.into());
        }

        let schemas = self
            .schemas
            .iter()
            .map(introspect)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut extras = Vec::with_capacity(self.extras.len());
        for field in &self.extras {
            if !config_schema_core::is_valid_field_name(&field.name) {
                return Err(SchemaError::InvalidFieldName {
                    schema: String::new(),
                    field: field.name.clone(),
                }
                .into());
            }
            extras.push(describe_field(None, field)?);
        }

        let descriptors: Vec<&FieldDescriptor> = schemas
            .iter()
            .flat_map(|s| s.fields.iter())
            .chain(extras.iter())
            .collect();
        let grammar = ArgumentGrammar::synthesize(descriptors)?;

        if self.options.add_help && grammar.resolve("--help").is_some() {
            return Err(SchemaError::FlagConflict("--help".to_string()).into());
        }

        info!(
            schemas = schemas.len(),
            arguments = grammar.len(),
            "Built argument binder"
        );

        Ok(ArgumentBinder {
            schemas,
            grammar,
            options: self.options,
        })
    }
}

/// Binds inputs from several sources into typed configuration instances.
///
/// # Examples
///
/// ```
/// use config_schema_bind::{ArgumentBinder, BindError};
/// use config_schema_core::*;
///
/// let schema = ConfigSchema::new("basic")
///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
///     .with_field(FieldSchema::new("bar", TypeDescriptor::Float))
///     .with_field(FieldSchema::new("baz", TypeDescriptor::Str))
///     .with_field(FieldSchema::new("flag", TypeDescriptor::Bool).with_default(true));
/// let binder = ArgumentBinder::builder()
///     .schema(schema)
///     .look_for_args_file(false)
///     .build()
///     .unwrap();
///
/// let err = binder.bind_args(Vec::<String>::new()).unwrap_err();
/// assert!(matches!(err, BindError::MissingRequired(ref f) if f == &["foo", "bar", "baz"]));
///
/// let binding = binder.bind_args(["--foo", "1", "--bar", "2.5", "--baz", "x"]).unwrap();
/// let basic = &binding.instances[0];
/// assert_eq!(basic.get("bar"), Some(&Value::Float(2.5)));
/// assert_eq!(basic.get("flag"), Some(&Value::Bool(true)));
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentBinder {
    schemas: Vec<SchemaDescriptor>,
    grammar: ArgumentGrammar,
    options: BinderOptions,
}

impl ArgumentBinder {
    pub fn builder() -> BinderBuilder {
        BinderBuilder::default()
    }

    /// Builds a binder for `schemas` with default options.
    pub fn new(schemas: impl IntoIterator<Item = ConfigSchema>) -> Result<Self> {
        Self::builder().schemas(schemas).build()
    }

    pub fn grammar(&self) -> &ArgumentGrammar {
        &self.grammar
    }

    pub fn schemas(&self) -> &[SchemaDescriptor] {
        &self.schemas
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Program name used in usage text.
    pub fn program(&self) -> String {
        self.options
            .program
            .clone()
            .or_else(|| {
                current_entry()
                    .as_deref()
                    .and_then(Path::file_stem)
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
    }

    /// Renders usage for the combined grammar.
    pub fn render_help(&self) -> String {
        self.grammar
            .render_help(&self.program(), self.options.add_help)
    }

    /// Binds the live process arguments (`argv[1..]`).
    pub fn bind_env_args(&self) -> Result<Binding> {
        self.bind_args(
            std::env::args_os()
                .skip(1)
                .map(|a| a.to_string_lossy().into_owned()),
        )
    }

    /// Binds explicit tokens.
    ///
    /// When enabled, the entry point's response file is prepended first.
    ///
    /// # Errors
    ///
    /// [`BindError::Value`] for a token that fails coercion,
    /// [`BindError::MissingRequired`] for required fields left unset,
    /// [`BindError::Unrecognized`] for unclaimed tokens in strict mode,
    /// [`BindError::ExpectedArgument`] for a flag missing its values, and
    /// [`BindError::HelpRequested`] for `-h`/`--help`.
    pub fn bind_args<I, S>(&self, args: I) -> Result<Binding>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        if self.options.look_for_args_file {
            let entry = self.options.entry_point.clone().or_else(current_entry);
            tokens = augment(entry.as_deref(), tokens)?;
        }

        let program = self.options.add_help.then(|| self.program());
        let parsed = parse_tokens(&self.grammar, &tokens, program.as_deref())?;

        if !self.options.lenient && !parsed.leftover.is_empty() {
            return Err(BindError::Unrecognized(parsed.leftover));
        }

        let mut supplied = parsed.values;
        let mut missing = Vec::new();
        let mut owned: HashMap<&str, IndexMap<String, Value>> = HashMap::new();
        let mut leftover_fields = IndexMap::new();

        for spec in self.grammar.arguments() {
            let value = match supplied.shift_remove(&spec.dest) {
                Some(value) => value,
                None => match &spec.default {
                    Some(default) => default.resolve(),
                    None => {
                        // Only required arguments lack a default.
                        missing.push(spec.dest.clone());
                        continue;
                    }
                },
            };
            match spec.owner.as_deref() {
                Some(owner) => {
                    owned
                        .entry(owner)
                        .or_default()
                        .insert(spec.dest.clone(), value);
                }
                None => {
                    leftover_fields.insert(spec.dest.clone(), value);
                }
            }
        }

        if !missing.is_empty() {
            return Err(BindError::MissingRequired(missing));
        }

        let instances = self
            .schemas
            .iter()
            .map(|schema| {
                let mut values = owned.remove(schema.name.as_str()).unwrap_or_default();
                assemble(schema, &mut values)
            })
            .collect();

        debug!(
            tokens = tokens.len(),
            leftover = parsed.leftover.len(),
            "Bound command-line arguments"
        );

        Ok(Binding {
            instances,
            leftover_fields,
            leftover_tokens: parsed.leftover,
        })
    }

    /// Binds a mapping of field name to value.
    ///
    /// Keys are matched against each schema's constructible fields; unknown
    /// keys are ignored and never collected. Values must already have the
    /// field's type, except that integers widen to floats and enumeration
    /// fields accept a member's literal or name.
    ///
    /// # Errors
    ///
    /// [`BindError::Value`] for a value of the wrong type and
    /// [`BindError::MissingRequired`] for required fields absent from the
    /// mapping, including a required list given as an empty sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_bind::{ArgumentBinder, Mapping};
    /// use config_schema_core::*;
    ///
    /// let binder = ArgumentBinder::new([ConfigSchema::new("s")
    ///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
    ///     .with_field(FieldSchema::new("bar", TypeDescriptor::Float).with_default(0.5))])
    /// .unwrap();
    ///
    /// let mut mapping = Mapping::new();
    /// mapping.insert("foo".into(), Value::Int(12));
    /// mapping.insert("unrelated".into(), Value::from("ignored"));
    ///
    /// let binding = binder.bind_mapping(&mapping).unwrap();
    /// assert_eq!(binding.instances[0].get("bar"), Some(&Value::Float(0.5)));
    /// assert!(!binding.has_leftovers());
    /// ```
    pub fn bind_mapping(&self, mapping: &Mapping) -> Result<Binding> {
        let mut missing = Vec::new();
        let mut instances = Vec::with_capacity(self.schemas.len());

        for schema in &self.schemas {
            let mut values = IndexMap::new();
            for field in &schema.fields {
                let supplied = mapping
                    .get(&field.name)
                    .map(|value| field.conform(value))
                    .transpose()?
                    // A required list needs at least one element.
                    .filter(|value| {
                        !(field.required && value.as_list().is_some_and(<[_]>::is_empty))
                    });
                let value = match supplied {
                    Some(value) => value,
                    None => match &field.default {
                        Some(default) => default.resolve(),
                        // An undeclared bool default reads as true.
                        None if !field.required => Value::Bool(true),
                        None => {
                            missing.push(field.name.clone());
                            continue;
                        }
                    },
                };
                values.insert(field.name.clone(), value);
            }
            instances.push(assemble(schema, &mut values));
        }

        if !missing.is_empty() {
            return Err(BindError::MissingRequired(missing));
        }
        debug!(keys = mapping.len(), "Bound mapping");
        Ok(Binding {
            instances,
            ..Binding::default()
        })
    }

    /// Binds a JSON document held in memory.
    pub fn bind_json_str(&self, text: &str) -> Result<Binding> {
        self.bind_mapping(&parse_json_mapping(text)?)
    }

    /// Binds a JSON file.
    pub fn bind_json_file(&self, path: impl AsRef<Path>) -> Result<Binding> {
        self.bind_mapping(&load_json_mapping(path)?)
    }

    /// Binds a YAML document held in memory.
    pub fn bind_yaml_str(&self, text: &str) -> Result<Binding> {
        self.bind_mapping(&parse_yaml_mapping(text)?)
    }

    /// Binds a YAML file.
    pub fn bind_yaml_file(&self, path: impl AsRef<Path>) -> Result<Binding> {
        self.bind_mapping(&load_yaml_mapping(path)?)
    }
}

/// Orders bound values by the schema's declaration and fills in fields
/// excluded from construction.
fn assemble(schema: &SchemaDescriptor, values: &mut IndexMap<String, Value>) -> ConfigInstance {
    let mut instance = ConfigInstance::new(&schema.name);
    for name in &schema.order {
        let value = match values.shift_remove(name) {
            Some(value) => value,
            None => match schema.fixed_field(name) {
                Some(fixed) => fixed.default.resolve(),
                None => continue,
            },
        };
        instance.values.insert(name.clone(), value);
    }
    instance
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_schema_core::TypeDescriptor;

    fn binder(schemas: Vec<ConfigSchema>) -> ArgumentBinder {
        ArgumentBinder::builder()
            .schemas(schemas)
            .look_for_args_file(false)
            .program("prog")
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_across_schemas_conflicts() {
        let a = ConfigSchema::new("a").with_field(FieldSchema::new("foo", TypeDescriptor::Int));
        let b = ConfigSchema::new("b").with_field(FieldSchema::new("foo", TypeDescriptor::Str));
        let err = ArgumentBinder::new([a, b]).unwrap_err();
        assert!(matches!(
            err,
            BindError::Schema(SchemaError::FlagConflict(ref flag)) if flag == "--foo"
        ));
    }

    #[test]
    fn test_help_field_conflicts_only_with_add_help() {
        let schema =
            ConfigSchema::new("s").with_field(FieldSchema::new("help", TypeDescriptor::Str));
        assert!(ArgumentBinder::new([schema.clone()]).is_err());
        assert!(
            ArgumentBinder::builder()
                .schema(schema)
                .add_help(false)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_missing_required_aggregates_across_schemas() {
        let a = ConfigSchema::new("a").with_field(FieldSchema::new("foo", TypeDescriptor::Int));
        let b = ConfigSchema::new("b").with_field(FieldSchema::new("bar", TypeDescriptor::Str));
        let binder = binder(vec![a, b]);
        let err = binder.bind_args(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingRequired(ref f) if f == &["foo", "bar"]));

        let err = binder.bind_mapping(&Mapping::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingRequired(ref f) if f == &["foo", "bar"]));
    }

    #[test]
    fn test_partition_by_owner() {
        let a = ConfigSchema::new("a").with_field(FieldSchema::new("foo", TypeDescriptor::Int));
        let b = ConfigSchema::new("b").with_field(FieldSchema::new("bar", TypeDescriptor::Str));
        let binding = binder(vec![a, b])
            .bind_args(["--bar", "x", "--foo", "1"])
            .unwrap();
        assert_eq!(binding.instances[0].schema, "a");
        assert_eq!(binding.instances[0].values.len(), 1);
        assert_eq!(binding.instances[1].get("bar"), Some(&Value::from("x")));
        assert!(binding.leftover_fields.is_empty());
    }

    #[test]
    fn test_strict_rejects_unknown_tokens() {
        let schema = ConfigSchema::new("s")
            .with_field(FieldSchema::new("foo", TypeDescriptor::Int).with_default(1));
        let err = binder(vec![schema]).bind_args(["--bar", "2"]).unwrap_err();
        assert_eq!(err.to_string(), "unrecognized arguments: --bar 2");
    }

    #[test]
    fn test_non_init_field_in_instance() {
        let schema = ConfigSchema::new("s")
            .with_field(FieldSchema::new("foo", TypeDescriptor::Int).with_default(1))
            .with_field(
                FieldSchema::new("cache", TypeDescriptor::Str)
                    .with_default("/tmp")
                    .no_init(),
            )
            .with_field(FieldSchema::new("bar", TypeDescriptor::Int).with_default(2));
        let binder = binder(vec![schema]);

        assert!(binder.grammar().argument("cache").is_none());
        let binding = binder.bind_args(Vec::<String>::new()).unwrap();
        let keys: Vec<&String> = binding.instances[0].values.keys().collect();
        assert_eq!(keys, vec!["foo", "cache", "bar"]);

        let mut mapping = Mapping::new();
        mapping.insert("cache".into(), Value::from("/elsewhere"));
        let binding = binder.bind_mapping(&mapping).unwrap();
        assert_eq!(binding.instances[0].get("cache"), Some(&Value::from("/tmp")));
    }

    #[test]
    fn test_factory_called_per_binding() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicI64, Ordering};

        let counter = Arc::new(AtomicI64::new(0));
        let c = Arc::clone(&counter);
        let schema = ConfigSchema::new("s").with_field(
            FieldSchema::new("run", TypeDescriptor::Int)
                .with_factory(move || Value::Int(c.fetch_add(1, Ordering::SeqCst))),
        );
        let binder = binder(vec![schema]);
        let first = binder.bind_args(Vec::<String>::new()).unwrap();
        let second = binder.bind_args(Vec::<String>::new()).unwrap();
        assert_eq!(first.instances[0].get("run"), Some(&Value::Int(0)));
        assert_eq!(second.instances[0].get("run"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_empty_required_list_is_missing() {
        let schema = ConfigSchema::new("s")
            .with_field(FieldSchema::new("xs", TypeDescriptor::list(TypeDescriptor::Int)))
            .with_field(
                FieldSchema::new("ys", TypeDescriptor::list(TypeDescriptor::Int))
                    .with_default(vec![1]),
            );
        let binder = binder(vec![schema]);

        let mut mapping = Mapping::new();
        mapping.insert("xs".into(), Value::List(Vec::new()));
        let err = binder.bind_mapping(&mapping).unwrap_err();
        assert!(matches!(err, BindError::MissingRequired(ref f) if f == &["xs"]));

        mapping.insert("xs".into(), Value::from(vec![3]));
        mapping.insert("ys".into(), Value::List(Vec::new()));
        let binding = binder.bind_mapping(&mapping).unwrap();
        assert_eq!(binding.instances[0].get("ys"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_mapping_rejects_wrong_type() {
        let schema =
            ConfigSchema::new("s").with_field(FieldSchema::new("foo", TypeDescriptor::Int));
        let mut mapping = Mapping::new();
        mapping.insert("foo".into(), Value::from("12"));
        let err = binder(vec![schema]).bind_mapping(&mapping).unwrap_err();
        let BindError::Value(e) = err else {
            panic!("expected value error");
        };
        assert_eq!(e.field, "foo");
        assert_eq!(e.token, "12");
    }

    #[test]
    fn test_binder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArgumentBinder>();
    }
}
