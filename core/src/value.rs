//! Dynamic configuration values.
//!
//! [`Value`] is what coercion produces and what instances hold. It maps
//! one-to-one onto JSON/YAML scalars and sequences, except for
//! [`Value::Enum`], which remembers the member a literal resolved to and
//! serializes as the literal.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// Tokens accepted as `true` by [`parse_truthy`] (case-insensitive).
pub const TRUTHY: [&str; 5] = ["yes", "true", "t", "y", "1"];

/// Tokens accepted as `false` by [`parse_truthy`] (case-insensitive).
pub const FALSY: [&str; 5] = ["no", "false", "f", "n", "0"];

/// A configuration value.
///
/// # Examples
///
/// ```
/// use config_schema_core::Value;
///
/// let v = Value::from(vec![1, 2, 3]);
/// assert_eq!(v, Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
/// assert_eq!(v.to_string(), "[1, 2, 3]");
/// assert_eq!(serde_json::to_string(&v).unwrap(), "[1,2,3]");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent / null.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// A resolved enumeration member together with its literal.
    Enum { member: String, literal: Box<Value> },
    List(Vec<Value>),
}

impl Value {
    /// Returns `true` for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the member name for [`Value::Enum`].
    pub fn enum_member(&self) -> Option<&str> {
        match self {
            Self::Enum { member, .. } => Some(member),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Enum { .. } => "enum",
            Self::List(_) => "list",
        }
    }

    /// Converts a JSON value.
    ///
    /// Objects have no counterpart and are rejected; the error string names
    /// what was found.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, String> {
        Ok(match json {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(
                    n.as_f64()
                        .ok_or_else(|| format!("number {n} is out of range"))?,
                ),
            },
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_json::Value::Object(_) => {
                return Err("nested mappings are not supported".to_string());
            }
        })
    }

    /// Converts to a JSON value. Enumeration members become their literal.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::None => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Enum { literal, .. } => literal.to_json(),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Enum { literal, .. } => write!(f, "{literal}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Enum { literal, .. } => literal.serialize(serializer),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&json).map_err(D::Error::custom)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}

/// Parses truthy/falsy text.
///
/// Accepts, case-insensitively, `yes/true/t/y/1` and `no/false/f/n/0`.
///
/// # Errors
///
/// Returns a [`ValueError`] naming `field` and the token for anything else.
///
/// # Examples
///
/// ```
/// use config_schema_core::parse_truthy;
///
/// assert_eq!(parse_truthy("flag", "Yes"), Ok(true));
/// assert_eq!(parse_truthy("flag", "F"), Ok(false));
/// assert!(parse_truthy("flag", "maybe").is_err());
/// ```
pub fn parse_truthy(field: &str, token: &str) -> Result<bool, ValueError> {
    let lowered = token.to_lowercase();
    if TRUTHY.contains(&lowered.as_str()) {
        Ok(true)
    } else if FALSY.contains(&lowered.as_str()) {
        Ok(false)
    } else {
        Err(ValueError::new(
            field,
            token,
            "truthy value expected: one of yes/no, true/false, t/f, y/n, 1/0 (case insensitive)",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_truthy_case_insensitive() {
        for token in ["yes", "TRUE", "t", "Y", "1"] {
            assert_eq!(parse_truthy("f", token), Ok(true), "{token}");
        }
        for token in ["No", "false", "F", "n", "0"] {
            assert_eq!(parse_truthy("f", token), Ok(false), "{token}");
        }
    }

    #[test]
    fn test_parse_truthy_rejects_other_tokens() {
        let err = parse_truthy("flag", "2").unwrap_err();
        assert_eq!(err.token, "2");
        assert!(err.to_string().contains("flag"));
    }

    #[test]
    fn test_from_json_numbers() {
        assert_eq!(Value::from_json(&serde_json::json!(3)), Ok(Value::Int(3)));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Ok(Value::Float(2.5)));
        assert!(Value::from_json(&serde_json::json!({"a": 1})).is_err());
    }

    #[test]
    fn test_enum_serializes_as_literal() {
        let v = Value::Enum {
            member: "toto".into(),
            literal: Box::new(Value::from("toto")),
        };
        assert_eq!(v.to_json(), serde_json::json!("toto"));
        assert_eq!(v.to_string(), "toto");
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let v: Value = serde_yaml::from_str("[1, 2.5, x, null]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::None
            ])
        );
    }
}
