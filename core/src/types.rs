//! Schema declaration types.
//!
//! A [`ConfigSchema`] is an ordered list of [`FieldSchema`]s, each carrying a
//! [`TypeDescriptor`]: a small, language-neutral type tree that the
//! [classifier](crate::classify) maps onto the categories the binder knows
//! how to parse. All declaration types round-trip through JSON and YAML.

use std::fmt;
use std::sync::Arc;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::Value;

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaPackage`](crate::SchemaPackage) to track
/// compatibility across releases.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Scalar types a token can be coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Int,
    Float,
    Str,
    Bool,
}

impl ScalarType {
    /// Lowercase type name as it appears in declarations.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
        }
    }

    /// Returns `true` if `value` is a literal of this scalar type.
    pub fn admits(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::Str, Value::Str(_))
                | (Self::Bool, Value::Bool(_))
        )
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared type of a field.
///
/// Serialized externally tagged in snake case, so declarations read as
/// `int`, `{list: float}`, `{optional: str}` or
/// `{union: [int, none]}`.
///
/// # Examples
///
/// ```
/// use config_schema_core::TypeDescriptor;
///
/// let ty = TypeDescriptor::optional(TypeDescriptor::list(TypeDescriptor::Int));
/// assert_eq!(ty.to_string(), "optional[list[int]]");
///
/// let parsed: TypeDescriptor = serde_json::from_str(r#"{"optional": {"list": "int"}}"#).unwrap();
/// assert_eq!(parsed, ty);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Int,
    Float,
    Str,
    Bool,
    /// The unit/null type; only meaningful inside a union.
    None,
    Enum(EnumType),
    List(Box<TypeDescriptor>),
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// Reference to a type by name that has not been resolved.
    Named(String),
}

/// Input form of [`TypeDescriptor`]: single-key maps (`{list: int}`) in
/// every self-describing format, including YAML.
#[derive(Deserialize)]
#[serde(remote = "TypeDescriptor", rename_all = "snake_case")]
enum TaggedType {
    Int,
    Float,
    Str,
    Bool,
    None,
    Enum(EnumType),
    List(Box<TypeDescriptor>),
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    Named(String),
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        TaggedType::deserialize(json).map_err(D::Error::custom)
    }
}

impl TypeDescriptor {
    pub fn list(element: TypeDescriptor) -> Self {
        Self::List(Box::new(element))
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Returns the scalar type for the four scalar descriptors.
    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Self::Int => Some(ScalarType::Int),
            Self::Float => Some(ScalarType::Float),
            Self::Str => Some(ScalarType::Str),
            Self::Bool => Some(ScalarType::Bool),
            _ => None,
        }
    }
}

impl From<ScalarType> for TypeDescriptor {
    fn from(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Int => Self::Int,
            ScalarType::Float => Self::Float,
            ScalarType::Str => Self::Str,
            ScalarType::Bool => Self::Bool,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[&TypeDescriptor]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::Bool => f.write_str("bool"),
            Self::None => f.write_str("none"),
            Self::Enum(e) => write!(f, "enum {}", e.name),
            Self::List(elem) => write!(f, "list[{elem}]"),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::Union(members) => {
                f.write_str("union[")?;
                join(f, &members.iter().collect::<Vec<_>>())?;
                f.write_str("]")
            }
            Self::Map(k, v) => {
                f.write_str("map[")?;
                join(f, &[k.as_ref(), v.as_ref()])?;
                f.write_str("]")
            }
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// One member of an [`EnumType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Value,
}

/// An enumeration with an explicitly declared literal type.
///
/// Members are kept in declaration order; that order is the order of
/// allowed values in the synthesized grammar.
///
/// # Examples
///
/// ```
/// use config_schema_core::{EnumType, ScalarType, Value};
///
/// let level = EnumType::new("Level", ScalarType::Int)
///     .with_member("low", 1)
///     .with_member("high", 10);
/// assert_eq!(level.literals(), vec![&Value::Int(1), &Value::Int(10)]);
///
/// let basic = EnumType::of_strings("BasicEnum", &["titi", "toto"]);
/// assert_eq!(basic.find_literal(&Value::from("toto")).unwrap().name, "toto");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    /// Scalar type every member literal must have.
    pub scalar: ScalarType,
    pub members: Vec<EnumMember>,
}

impl EnumType {
    pub fn new(name: &str, scalar: ScalarType) -> Self {
        Self {
            name: name.to_string(),
            scalar,
            members: Vec::new(),
        }
    }

    /// String enumeration whose member names equal their literals.
    pub fn of_strings(name: &str, literals: &[&str]) -> Self {
        literals
            .iter()
            .fold(Self::new(name, ScalarType::Str), |e, lit| e.with_member(lit, *lit))
    }

    pub fn with_member(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.push(EnumMember {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Literal values in declaration order.
    pub fn literals(&self) -> Vec<&Value> {
        self.members.iter().map(|m| &m.value).collect()
    }

    /// Finds the member whose literal equals `literal`.
    pub fn find_literal(&self, literal: &Value) -> Option<&EnumMember> {
        self.members.iter().find(|m| &m.value == literal)
    }

    pub fn find_member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Builds the [`Value::Enum`] for a member.
    pub fn value_of(member: &EnumMember) -> Value {
        Value::Enum {
            member: member.name.clone(),
            literal: Box::new(member.value.clone()),
        }
    }
}

/// A shared constructor for a field's default.
///
/// Invoked each time a default is needed, so every binding receives a fresh
/// value.
#[derive(Clone)]
pub struct DefaultFactory(Arc<dyn Fn() -> Value + Send + Sync>);

impl DefaultFactory {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for DefaultFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultFactory(..)")
    }
}

/// A resolved default: either a literal or a factory.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Literal(Value),
    Factory(DefaultFactory),
}

impl DefaultValue {
    /// Produces the default value.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Factory(f) => f.call(),
        }
    }

    /// Returns the literal, if this default is not a factory.
    pub fn literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Factory(_) => None,
        }
    }
}

/// Declaration of a single configuration field.
///
/// A present-but-null `default` in JSON/YAML declares a `none` default, which
/// is distinct from having no default at all.
///
/// # Examples
///
/// ```
/// use config_schema_core::{FieldSchema, TypeDescriptor, Value};
///
/// let field = FieldSchema::new("baz", TypeDescriptor::Str)
///     .with_default("toto")
///     .with_help("help message");
/// assert_eq!(field.default, Some(Value::from("toto")));
/// assert!(field.init);
///
/// let yaml = "name: opt\ntype: {optional: bool}\ndefault: null\n";
/// let parsed: FieldSchema = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(parsed.default, Some(Value::None));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Literal default.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Default constructor; takes precedence over `default` when both are set.
    #[serde(skip)]
    pub default_factory: Option<DefaultFactory>,
    /// Help text shown in the rendered usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// `false` excludes the field from the argument grammar; its value then
    /// always comes from its default.
    #[serde(default = "default_init", skip_serializing_if = "is_true")]
    pub init: bool,
}

fn deserialize_present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

fn default_init() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

impl FieldSchema {
    pub fn new(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            ty,
            default: None,
            default_factory: None,
            help: None,
            init: true,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_factory(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default_factory = Some(DefaultFactory::new(f));
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    /// Excludes the field from construction (`init = false`).
    pub fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    /// The declared default, factory first.
    pub fn declared_default(&self) -> Option<DefaultValue> {
        self.default_factory
            .clone()
            .map(DefaultValue::Factory)
            .or_else(|| self.default.clone().map(DefaultValue::Literal))
    }
}

/// A named, ordered set of configuration fields.
///
/// # Examples
///
/// ```
/// use config_schema_core::{ConfigSchema, FieldSchema, TypeDescriptor};
///
/// let schema = ConfigSchema::new("train")
///     .with_field(FieldSchema::new("foo", TypeDescriptor::Int))
///     .with_field(FieldSchema::new("flag", TypeDescriptor::Bool).with_default(true));
///
/// assert_eq!(schema.field_names(), vec!["foo", "flag"]);
/// assert!(schema.find_field("flag").is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl ConfigSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
