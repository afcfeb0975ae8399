//! Classified, synthesis-ready field descriptions.
//!
//! A [`FieldDescriptor`] is what the introspector hands to the grammar
//! synthesizer: the declared type has been reduced to a [`TypeCategory`]
//! plus a `nullable` flag, and the default has been resolved. Coercion of
//! command-line tokens ([`TypeCategory::coerce_token`]) and conformance of
//! already-typed mapping values ([`FieldDescriptor::conform`]) live here so
//! every input source shares one set of rules.

use crate::error::ValueError;
use crate::types::{DefaultValue, EnumType, ScalarType};
use crate::value::{Value, parse_truthy};

/// The categories the binder knows how to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeCategory {
    Int,
    Float,
    Str,
    Bool,
    Enum(EnumType),
    /// Homogeneous list of a scalar element type.
    List(ScalarType),
}

impl TypeCategory {
    /// Member literals of an enumeration, in declaration order.
    pub fn enum_values(&self) -> Option<Vec<&Value>> {
        match self {
            Self::Enum(e) => Some(e.literals()),
            _ => None,
        }
    }

    /// Name used in help output and serialized grammars.
    pub fn name(&self) -> String {
        match self {
            Self::Int => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::Str => "str".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Enum(e) => format!("enum {}", e.name),
            Self::List(elem) => format!("list[{elem}]"),
        }
    }

    /// Coerces one command-line token.
    ///
    /// For lists this coerces a single element; the caller collects them.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] naming `field` and `token` if the token does
    /// not parse, or is not one of an enumeration's literals.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_core::{EnumType, ScalarType, TypeCategory, Value};
    ///
    /// assert_eq!(TypeCategory::Int.coerce_token("foo", "12"), Ok(Value::Int(12)));
    /// assert_eq!(
    ///     TypeCategory::List(ScalarType::Float).coerce_token("xs", "0.5"),
    ///     Ok(Value::Float(0.5))
    /// );
    ///
    /// let cat = TypeCategory::Enum(EnumType::of_strings("BasicEnum", &["titi", "toto"]));
    /// assert_eq!(cat.coerce_token("foo", "titi").unwrap().enum_member(), Some("titi"));
    /// assert!(cat.coerce_token("foo", "tata").is_err());
    /// ```
    pub fn coerce_token(&self, field: &str, token: &str) -> Result<Value, ValueError> {
        match self {
            Self::Int => coerce_scalar(field, ScalarType::Int, token),
            Self::Float => coerce_scalar(field, ScalarType::Float, token),
            Self::Str => coerce_scalar(field, ScalarType::Str, token),
            Self::Bool => coerce_scalar(field, ScalarType::Bool, token),
            Self::List(elem) => coerce_scalar(field, *elem, token),
            Self::Enum(e) => {
                let literal = coerce_scalar(field, e.scalar, token)?;
                e.find_literal(&literal)
                    .map(EnumType::value_of)
                    .ok_or_else(|| {
                        let reason = format!("invalid choice: expected one of {}", choices(e));
                        ValueError::new(field, token, reason)
                    })
            }
        }
    }

    /// Checks an already-typed value against this category.
    ///
    /// Integers widen to floats; enumeration literals and member names
    /// resolve to members. Nothing else is converted.
    fn conform_value(&self, field: &str, value: &Value) -> Result<Value, ValueError> {
        let mismatch = || {
            ValueError::new(
                field,
                value.to_string(),
                format!("expected {}, found {}", self.name(), value.kind()),
            )
        };

        match (self, value) {
            (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::Bool, Value::Bool(_)) => Ok(value.clone()),
            (Self::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (Self::Enum(e), Value::Enum { member, .. }) => e
                .find_member(member)
                .map(EnumType::value_of)
                .ok_or_else(mismatch),
            (Self::Enum(e), literal) => e
                .find_literal(literal)
                .or_else(|| literal.as_str().and_then(|name| e.find_member(name)))
                .map(EnumType::value_of)
                .ok_or_else(|| {
                    ValueError::new(
                        field,
                        literal.to_string(),
                        format!("invalid choice: expected one of {}", choices(e)),
                    )
                }),
            (Self::List(elem), Value::List(items)) => {
                let elem_category = TypeCategory::from(*elem);
                items
                    .iter()
                    .map(|item| elem_category.conform_value(field, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            _ => Err(mismatch()),
        }
    }
}

impl From<ScalarType> for TypeCategory {
    fn from(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Int => Self::Int,
            ScalarType::Float => Self::Float,
            ScalarType::Str => Self::Str,
            ScalarType::Bool => Self::Bool,
        }
    }
}

fn choices(e: &EnumType) -> String {
    e.members
        .iter()
        .map(|m| format!("'{}'", m.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn coerce_scalar(field: &str, scalar: ScalarType, token: &str) -> Result<Value, ValueError> {
    match scalar {
        ScalarType::Int => token
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ValueError::new(field, token, "invalid int value")),
        ScalarType::Float => token
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ValueError::new(field, token, "invalid float value")),
        ScalarType::Str => Ok(Value::Str(token.to_string())),
        ScalarType::Bool => parse_truthy(field, token).map(Value::Bool),
    }
}

/// The classified description of one schema field.
///
/// `owner` is the name of the schema the field belongs to; `None` marks an
/// extra argument registered outside any schema, whose parsed value ends up
/// among the leftovers.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub owner: Option<String>,
    pub name: String,
    pub category: TypeCategory,
    /// Declared as optional: accepts absence and `none`.
    pub nullable: bool,
    /// No value from any source is an error.
    pub required: bool,
    pub default: Option<DefaultValue>,
    pub help: Option<String>,
}

impl FieldDescriptor {
    /// Allowed literals for enumeration fields, in declaration order.
    pub fn enum_values(&self) -> Option<Vec<&Value>> {
        self.category.enum_values()
    }

    /// Element type for list fields.
    pub fn element_type(&self) -> Option<ScalarType> {
        match self.category {
            TypeCategory::List(elem) => Some(elem),
            _ => None,
        }
    }

    /// Coerces one command-line token for this field.
    pub fn coerce_token(&self, token: &str) -> Result<Value, ValueError> {
        self.category.coerce_token(&self.name, token)
    }

    /// Conforms a mapping-supplied value to this field's type.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueError`] when the value's kind does not match, or when
    /// `none` is supplied for a field that is not nullable.
    ///
    /// # Examples
    ///
    /// ```
    /// use config_schema_core::{ConfigSchema, FieldSchema, TypeDescriptor, Value, introspect};
    ///
    /// let schema = ConfigSchema::new("s")
    ///     .with_field(FieldSchema::new("bar", TypeDescriptor::Float))
    ///     .with_field(FieldSchema::new("opt", TypeDescriptor::optional(TypeDescriptor::Int)));
    /// let desc = introspect(&schema).unwrap();
    ///
    /// assert_eq!(desc.fields[0].conform(&Value::Int(2)), Ok(Value::Float(2.0)));
    /// assert_eq!(desc.fields[1].conform(&Value::None), Ok(Value::None));
    /// assert!(desc.fields[0].conform(&Value::None).is_err());
    /// ```
    pub fn conform(&self, value: &Value) -> Result<Value, ValueError> {
        if value.is_none() {
            return if self.nullable {
                Ok(Value::None)
            } else {
                Err(ValueError::new(
                    &self.name,
                    "none",
                    format!("expected {}, found none", self.category.name()),
                ))
            };
        }
        self.category.conform_value(&self.name, value)
    }
}
