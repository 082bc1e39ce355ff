//! Field values stored on data blocks.

use serde_json::{Number, Value};

/// A value stored under a field name.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<ScalarValue>),
}

impl ScalarValue {
    /// Encode for the store document.
    ///
    /// Non-finite floats have no JSON representation and encode as `null`,
    /// which [`ScalarValue::from_json`] rejects.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Decode a stored value. `None` for nulls, nested objects, and lists
    /// holding either.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Value::Null | Value::Object(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, or integers widened to float.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[ScalarValue]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        Self::Integer(i.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<ScalarValue>> From<Vec<T>> for ScalarValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_encoding() {
        let value = ScalarValue::from(vec![
            ScalarValue::from("a"),
            ScalarValue::from(1),
            ScalarValue::from(1.5),
            ScalarValue::from(true),
        ]);
        assert_eq!(value.to_json(), json!(["a", 1, 1.5, true]));
    }

    #[test]
    fn test_whole_float_stays_float() {
        let encoded = serde_json::to_string(&ScalarValue::Float(2.0).to_json()).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(ScalarValue::from_json(&decoded), Some(ScalarValue::Float(2.0)));
    }

    #[test]
    fn test_unsupported_values_rejected() {
        assert_eq!(ScalarValue::from_json(&Value::Null), None);
        assert_eq!(ScalarValue::from_json(&json!({ "nested": 1 })), None);
        assert_eq!(ScalarValue::from_json(&json!([1, null])), None);
        assert_eq!(ScalarValue::Float(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(ScalarValue::from(3).as_f64(), Some(3.0));
        assert_eq!(ScalarValue::from(3.5).as_i64(), None);
        assert_eq!(ScalarValue::from("x").as_str(), Some("x"));
        assert_eq!(ScalarValue::from(false).as_bool(), Some(false));
        assert_eq!(ScalarValue::from(vec![1, 2]).as_list().map(<[_]>::len), Some(2));
    }
}
