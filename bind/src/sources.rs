//! Document sources.
//!
//! JSON and YAML documents are read fully, parsed into a [`Mapping`], and
//! handed to the mapping binder. The document root must be a mapping; any
//! syntax or shape problem is a [`ParseError`] and nothing is bound.

use std::io::BufReader;
use std::path::Path;

use config_schema_core::{SchemaPackage, Value};
use indexmap::IndexMap;

use crate::error::{BindError, ParseError, Result};

/// Field name → value, in document order.
pub type Mapping = IndexMap<String, Value>;

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// Converts a parsed document into a [`Mapping`].
///
/// # Errors
///
/// Returns [`ParseError::NotAMapping`] if the root is not an object, and
/// [`ParseError::UnsupportedValue`] for nested objects.
pub fn mapping_from_json(json: serde_json::Value) -> std::result::Result<Mapping, ParseError> {
    let object = match json {
        serde_json::Value::Object(object) => object,
        other => return Err(ParseError::NotAMapping(json_kind(&other))),
    };
    object
        .into_iter()
        .map(|(key, value)| match Value::from_json(&value) {
            Ok(v) => Ok((key, v)),
            Err(reason) => Err(ParseError::UnsupportedValue { key, reason }),
        })
        .collect()
}

/// Parses a JSON document into a mapping.
///
/// # Examples
///
/// ```
/// use config_schema_bind::parse_json_mapping;
/// use config_schema_core::Value;
///
/// let m = parse_json_mapping(r#"{"foo": 12, "baz": "42"}"#).unwrap();
/// assert_eq!(m["foo"], Value::Int(12));
/// assert!(parse_json_mapping("[1, 2]").is_err());
/// ```
pub fn parse_json_mapping(text: &str) -> std::result::Result<Mapping, ParseError> {
    mapping_from_json(serde_json::from_str(text)?)
}

/// Parses a YAML document into a mapping.
pub fn parse_yaml_mapping(text: &str) -> std::result::Result<Mapping, ParseError> {
    mapping_from_json(serde_yaml::from_str(text)?)
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| BindError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses a JSON file into a mapping.
pub fn load_json_mapping(path: impl AsRef<Path>) -> Result<Mapping> {
    Ok(parse_json_mapping(&read_document(path.as_ref())?)?)
}

/// Reads and parses a YAML file into a mapping.
pub fn load_yaml_mapping(path: impl AsRef<Path>) -> Result<Mapping> {
    Ok(parse_yaml_mapping(&read_document(path.as_ref())?)?)
}

/// Loads a [`SchemaPackage`] from a JSON (`.json`) or YAML (anything else)
/// file.
///
/// # Errors
///
/// Returns [`BindError::Io`] if the file cannot be opened, or
/// [`BindError::Parse`] if it does not describe a package.
pub fn load_package(path: impl AsRef<Path>) -> Result<SchemaPackage> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| BindError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let package: SchemaPackage = if is_json {
        serde_json::from_reader(reader).map_err(ParseError::from)?
    } else {
        serde_yaml::from_reader(reader).map_err(ParseError::from)?
    };
    Ok(package)
}
