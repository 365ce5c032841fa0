//! Dynamically typed column values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single column value as returned by a relational source.
///
/// Serialized adjacently tagged (`{"type": "integer", "value": 1}`) so the
/// cache payload keeps timestamps distinct from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl ColumnValue {
    /// Plain JSON rendering used for CLI output (no type tags).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Integer(i) => serde_json::Value::from(*i),
            // Non-finite floats have no JSON number form
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
        }
    }

    /// Convert an untagged JSON scalar into a column value.
    ///
    /// Returns `None` for arrays and objects, which have no column equivalent.
    pub fn from_json_scalar(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Parse a command-line bind parameter.
    ///
    /// Tries, in order: `null`, `true`/`false`, integer, finite float,
    /// RFC 3339 timestamp. Anything else is bound as text.
    pub fn parse_param(raw: &str) -> Self {
        match raw {
            "null" => return Self::Null,
            "true" => return Self::Boolean(true),
            "false" => return Self::Boolean(false),
            _ => {}
        }

        if let Ok(i) = raw.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Self::Timestamp(ts.with_timezone(&Utc));
        }
        Self::Text(raw.to_string())
    }

    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Boolean(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for ColumnValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_param_scalars() {
        assert_eq!(ColumnValue::parse_param("null"), ColumnValue::Null);
        assert_eq!(ColumnValue::parse_param("true"), ColumnValue::Boolean(true));
        assert_eq!(ColumnValue::parse_param("false"), ColumnValue::Boolean(false));
        assert_eq!(ColumnValue::parse_param("42"), ColumnValue::Integer(42));
        assert_eq!(ColumnValue::parse_param("-7"), ColumnValue::Integer(-7));
        assert_eq!(ColumnValue::parse_param("2.5"), ColumnValue::Float(2.5));
    }

    #[test]
    fn test_parse_param_timestamp() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(
            ColumnValue::parse_param("2024-05-01T14:00:00+02:00"),
            ColumnValue::Timestamp(expected)
        );
    }

    #[test]
    fn test_parse_param_falls_back_to_text() {
        assert_eq!(
            ColumnValue::parse_param("alice"),
            ColumnValue::Text("alice".to_string())
        );
        // Non-finite floats are not numbers here
        assert_eq!(
            ColumnValue::parse_param("NaN"),
            ColumnValue::Text("NaN".to_string())
        );
        assert_eq!(
            ColumnValue::parse_param("inf"),
            ColumnValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let json = serde_json::to_string(&ColumnValue::Integer(1)).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":1}"#);

        let json = serde_json::to_string(&ColumnValue::Null).unwrap();
        assert_eq!(json, r#"{"type":"null"}"#);
    }

    #[test]
    fn test_to_json_is_untagged() {
        assert_eq!(ColumnValue::Integer(1).to_json(), serde_json::json!(1));
        assert_eq!(ColumnValue::from("a").to_json(), serde_json::json!("a"));
        assert_eq!(ColumnValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(ColumnValue::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_from_json_scalar() {
        assert_eq!(
            ColumnValue::from_json_scalar(&serde_json::json!(3)),
            Some(ColumnValue::Integer(3))
        );
        assert_eq!(
            ColumnValue::from_json_scalar(&serde_json::json!(0.5)),
            Some(ColumnValue::Float(0.5))
        );
        assert_eq!(ColumnValue::from_json_scalar(&serde_json::json!([1])), None);
        assert_eq!(ColumnValue::from_json_scalar(&serde_json::json!({"a": 1})), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnValue::Null.to_string(), "NULL");
        assert_eq!(ColumnValue::Boolean(true).to_string(), "true");
        assert_eq!(ColumnValue::from(Some(5_i64)).to_string(), "5");
        assert_eq!(ColumnValue::from(None::<i64>), ColumnValue::Null);
    }
}
