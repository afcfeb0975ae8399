use serde::{Deserialize, Serialize};

use crate::ConfigSchema;

/// Serializable bundle of schemas registered together.
///
/// A package is the on-disk form of a binder's schema set: the schemas, in
/// the order their instances are produced, plus version metadata. It
/// round-trips through JSON and YAML.
///
/// # Examples
///
/// ```
/// use config_schema_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.name = Some("training".into());
/// package.schemas.push(ConfigSchema::new("model"));
/// package.schemas.push(ConfigSchema::new("data"));
///
/// assert_eq!(package.schema_count(), 2);
/// assert_eq!(package.schema_version.as_deref(), Some(SCHEMA_CONTRACT_VERSION));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package format version (semver string).
    pub version: String,
    /// Optional package name; used as the program name in rendered usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schemas, in registration order.
    #[serde(default)]
    pub schemas: Vec<ConfigSchema>,
}

impl SchemaPackage {
    /// Creates an empty package.
    ///
    /// The `schema_version` is automatically set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            schemas: Vec::new(),
        }
    }

    /// Returns the number of schemas in this package.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn find_schema(&self, name: &str) -> Option<&ConfigSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }
}
