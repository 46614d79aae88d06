//! Set node: returns a fixed values object to downstream nodes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::NodeVariant;
use crate::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// A JSON object, or null.
    #[serde(default = "empty_object")]
    pub values: Value,
    /// Fields the editor does not model, carried through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SetData {
    fn default() -> Self {
        Self {
            label: None,
            values: empty_object(),
            extra: Map::new(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetBuffer {
    pub text: String,
}

pub struct SetVariant;

impl NodeVariant for SetVariant {
    type Data = SetData;
    type Buffer = SetBuffer;

    fn apply(buffer: &SetBuffer, current: &SetData) -> Result<SetData, ValidationError> {
        let values = if buffer.text.trim().is_empty() {
            empty_object()
        } else {
            serde_json::from_str::<Value>(&buffer.text).map_err(|_| ValidationError::InvalidJson)?
        };
        if !values.is_null() && !values.is_object() {
            return Err(ValidationError::NotAnObject);
        }
        Ok(SetData {
            label: current.label.clone(),
            values,
            extra: current.extra.clone(),
        })
    }

    fn reset(current: &SetData) -> SetBuffer {
        let values = if current.values.is_null() {
            empty_object()
        } else {
            current.values.clone()
        };
        SetBuffer {
            text: serde_json::to_string_pretty(&values).unwrap_or_else(|_| "{}".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apply(text: &str) -> Result<SetData, ValidationError> {
        SetVariant::apply(&SetBuffer { text: text.into() }, &SetData::default())
    }

    #[test]
    fn commits_parsed_object() {
        assert_eq!(apply(r#"{"a":1}"#).unwrap().values, json!({"a": 1}));
    }

    #[test]
    fn empty_buffer_commits_empty_object() {
        assert_eq!(apply("   \n").unwrap().values, json!({}));
    }

    #[test]
    fn null_is_accepted() {
        assert!(apply("null").unwrap().values.is_null());
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert_eq!(apply("not json"), Err(ValidationError::InvalidJson));
    }

    #[test]
    fn non_objects_are_rejected() {
        assert_eq!(apply("42"), Err(ValidationError::NotAnObject));
        assert_eq!(apply(r#""text""#), Err(ValidationError::NotAnObject));
        assert_eq!(apply("[1,2]"), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn apply_keeps_unmodelled_fields() {
        let current: SetData =
            serde_json::from_value(json!({"label": "S", "values": {}, "note": "keep me"})).unwrap();
        let data = SetVariant::apply(&SetBuffer { text: r#"{"a":1}"#.into() }, &current).unwrap();
        assert_eq!(data.extra.get("note"), Some(&json!("keep me")));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"label": "S", "values": {"a": 1}, "note": "keep me"})
        );
    }

    #[test]
    fn reset_renders_pretty_json() {
        let data = SetData {
            label: None,
            values: json!({"foo": "bar"}),
            extra: Map::new(),
        };
        assert_eq!(SetVariant::reset(&data).text, "{\n  \"foo\": \"bar\"\n}");
        let null = SetData {
            label: None,
            values: Value::Null,
            extra: Map::new(),
        };
        assert_eq!(SetVariant::reset(&null).text, "{}");
    }
}
