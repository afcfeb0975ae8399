//! Bound configuration instances.

use config_schema_core::Value;
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BindError, Result};
use crate::sources::Mapping;

/// Values bound for one schema, in the schema's field order.
///
/// # Examples
///
/// ```
/// use config_schema_bind::ConfigInstance;
/// use config_schema_core::Value;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Basic { foo: i64, flag: bool }
///
/// let mut instance = ConfigInstance::new("basic");
/// instance.values.insert("foo".into(), Value::Int(1));
/// instance.values.insert("flag".into(), Value::Bool(true));
///
/// let basic: Basic = instance.deserialize().unwrap();
/// assert_eq!(basic, Basic { foo: 1, flag: true });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigInstance {
    pub schema: String,
    pub values: IndexMap<String, Value>,
}

impl ConfigInstance {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            values: IndexMap::new(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The instance as a mapping that binds back to an equal instance.
    pub fn to_mapping(&self) -> Mapping {
        self.values.clone()
    }

    /// The instance as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Deserializes the instance into a typed configuration struct.
    ///
    /// Enumeration members deserialize from their literal.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Materialize`] if `T` does not accept the values.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(|source| BindError::Materialize {
            schema: self.schema.clone(),
            source,
        })
    }
}

/// Result of binding one input source.
///
/// `instances` follows the order the schemas were registered in.
/// `leftover_fields` holds values for extra arguments that belong to no
/// schema; `leftover_tokens` holds tokens the grammar did not claim (lenient
/// token binding only).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Binding {
    pub instances: Vec<ConfigInstance>,
    pub leftover_fields: IndexMap<String, Value>,
    pub leftover_tokens: Vec<String>,
}

impl Binding {
    /// The instance bound for `schema`.
    pub fn instance(&self, schema: &str) -> Option<&ConfigInstance> {
        self.instances.iter().find(|i| i.schema == schema)
    }

    /// Deserializes the instance bound for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnknownSchema`] if no such instance exists, or
    /// [`BindError::Materialize`] if `T` does not accept its values.
    pub fn extract<T: DeserializeOwned>(&self, schema: &str) -> Result<T> {
        self.instance(schema)
            .ok_or_else(|| BindError::UnknownSchema(schema.to_string()))?
            .deserialize()
    }

    /// All instances flattened into one mapping, in registration order.
    pub fn to_mapping(&self) -> Mapping {
        self.instances
            .iter()
            .flat_map(|i| i.values.iter().map(|(k, v)| (k.clone(), v.clone())))
            .collect()
    }

    pub fn has_leftovers(&self) -> bool {
        !self.leftover_fields.is_empty() || !self.leftover_tokens.is_empty()
    }
}
