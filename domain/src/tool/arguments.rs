//! Decoding of model-produced tool arguments
//!
//! Models send arguments as a JSON object string. They are decoded into
//! typed values against the tool's declared parameters before any
//! invocation code runs, so a malformed call fails with an
//! [`ArgumentError`] rather than an execution error.

use super::entities::{ParameterType, ToolDefinition};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors produced while decoding tool arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("arguments are not valid JSON: {0}")]
    Malformed(String),

    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter '{0}'")]
    MissingRequired(String),

    #[error("parameter '{name}' must be of type {expected}")]
    TypeMismatch {
        name: String,
        expected: ParameterType,
    },

    #[error("unknown parameter '{0}'")]
    Unknown(String),
}

/// A decoded argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    /// Array or object, kept as JSON
    Json(serde_json::Value),
}

impl ArgumentValue {
    fn decode(
        name: &str,
        expected: ParameterType,
        value: &serde_json::Value,
    ) -> Result<Self, ArgumentError> {
        let decoded = match expected {
            ParameterType::String => value.as_str().map(|s| ArgumentValue::Text(s.to_string())),
            ParameterType::Number => value.as_f64().map(ArgumentValue::Number),
            ParameterType::Integer => value.as_i64().map(ArgumentValue::Integer),
            ParameterType::Boolean => value.as_bool().map(ArgumentValue::Boolean),
            ParameterType::Array if value.is_array() => Some(ArgumentValue::Json(value.clone())),
            ParameterType::Object if value.is_object() => Some(ArgumentValue::Json(value.clone())),
            ParameterType::Array | ParameterType::Object => None,
        };

        decoded.ok_or_else(|| ArgumentError::TypeMismatch {
            name: name.to_string(),
            expected,
        })
    }
}

/// Validated arguments of one tool call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    values: BTreeMap<String, ArgumentValue>,
}

impl ToolArguments {
    /// Decode a raw JSON argument string against a definition.
    ///
    /// An empty string is treated as an empty object; `null` values for
    /// optional parameters are treated as absent.
    pub fn decode(definition: &ToolDefinition, raw: &str) -> Result<Self, ArgumentError> {
        let raw = raw.trim();
        let json: serde_json::Value = if raw.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(raw).map_err(|e| ArgumentError::Malformed(e.to_string()))?
        };

        let object = json.as_object().ok_or(ArgumentError::NotAnObject)?;

        if let Some(unknown) = object.keys().find(|k| definition.parameter(k).is_none()) {
            return Err(ArgumentError::Unknown(unknown.clone()));
        }

        let mut values = BTreeMap::new();
        for param in &definition.parameters {
            match object.get(&param.name) {
                Some(value) if !value.is_null() => {
                    let decoded = ArgumentValue::decode(&param.name, param.param_type, value)?;
                    values.insert(param.name.clone(), decoded);
                }
                _ if param.required => {
                    return Err(ArgumentError::MissingRequired(param.name.clone()));
                }
                _ => {}
            }
        }

        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgumentValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn require_str(&self, name: &str) -> Result<&str, ArgumentError> {
        self.get_str(name)
            .ok_or_else(|| ArgumentError::MissingRequired(name.to_string()))
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgumentValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgumentValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_json(&self, name: &str) -> Option<&serde_json::Value> {
        match self.values.get(name) {
            Some(ArgumentValue::Json(value)) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolParameter;

    fn definition() -> ToolDefinition {
        ToolDefinition::new("search", "Search files")
            .with_parameter(ToolParameter::new("pattern", "Pattern", true))
            .with_parameter(
                ToolParameter::new("limit", "Max results", false).with_type(ParameterType::Integer),
            )
            .with_parameter(
                ToolParameter::new("hidden", "Include hidden", false)
                    .with_type(ParameterType::Boolean),
            )
    }

    #[test]
    fn test_decode_typed_values() {
        let args =
            ToolArguments::decode(&definition(), r#"{"pattern":"*.rs","limit":5,"hidden":true}"#)
                .unwrap();

        assert_eq!(args.get_str("pattern"), Some("*.rs"));
        assert_eq!(args.get_integer("limit"), Some(5));
        assert_eq!(args.get_bool("hidden"), Some(true));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_decode_empty_string_as_empty_object() {
        let def = ToolDefinition::new("file_list", "List files")
            .with_parameter(ToolParameter::new("directory", "Directory", false));
        let args = ToolArguments::decode(&def, "").unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_null_optional_is_absent() {
        let args = ToolArguments::decode(&definition(), r#"{"pattern":"x","limit":null}"#).unwrap();
        assert_eq!(args.get_integer("limit"), None);
    }

    #[test]
    fn test_decode_errors() {
        let def = definition();

        assert!(matches!(
            ToolArguments::decode(&def, "{not json"),
            Err(ArgumentError::Malformed(_))
        ));
        assert_eq!(
            ToolArguments::decode(&def, "[1,2]"),
            Err(ArgumentError::NotAnObject)
        );
        assert_eq!(
            ToolArguments::decode(&def, r#"{"limit":1}"#),
            Err(ArgumentError::MissingRequired("pattern".to_string()))
        );
        assert_eq!(
            ToolArguments::decode(&def, r#"{"pattern":1}"#),
            Err(ArgumentError::TypeMismatch {
                name: "pattern".to_string(),
                expected: ParameterType::String,
            })
        );
        assert_eq!(
            ToolArguments::decode(&def, r#"{"pattern":"x","colour":"red"}"#),
            Err(ArgumentError::Unknown("colour".to_string()))
        );
    }

    #[test]
    fn test_decode_array_and_object() {
        let def = ToolDefinition::new("label", "Label issues")
            .with_parameter(
                ToolParameter::new("labels", "Labels", true).with_type(ParameterType::Array),
            )
            .with_parameter(
                ToolParameter::new("filter", "Filter", false).with_type(ParameterType::Object),
            );

        let args =
            ToolArguments::decode(&def, r#"{"labels":["bug","ui"],"filter":{"state":"open"}}"#)
                .unwrap();
        assert_eq!(args.get_json("labels"), Some(&serde_json::json!(["bug", "ui"])));
        assert_eq!(args.get_json("filter").unwrap()["state"], "open");

        assert_eq!(
            ToolArguments::decode(&def, r#"{"labels":"bug"}"#),
            Err(ArgumentError::TypeMismatch {
                name: "labels".to_string(),
                expected: ParameterType::Array,
            })
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ArgumentError::TypeMismatch {
            name: "limit".to_string(),
            expected: ParameterType::Integer,
        };
        assert_eq!(err.to_string(), "parameter 'limit' must be of type integer");
    }
}
