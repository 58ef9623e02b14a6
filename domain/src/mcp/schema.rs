//! Translation of remote JSON Schema parameter descriptions

use crate::tool::{ParameterType, ToolDefinition, ToolParameter};
use serde_json::Value;

/// Converts an MCP tool `inputSchema` (a JSON Schema object) into local
/// parameters, sorted by name. Each parameter keeps its declared property
/// schema so nested types reach the model unchanged.
pub fn parameters_from_schema(schema: &Value) -> Vec<ToolParameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut parameters: Vec<ToolParameter> = properties
        .iter()
        .map(|(name, property)| {
            let param_type = property
                .get("type")
                .and_then(Value::as_str)
                .map(ParameterType::from_json_type)
                .unwrap_or(ParameterType::String);
            let description = property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();

            ToolParameter::new(name.clone(), description, required.contains(&name.as_str()))
                .with_type(param_type)
                .with_schema(property.clone())
        })
        .collect();

    parameters.sort_by(|a, b| a.name.cmp(&b.name));
    parameters
}

/// Builds a local definition for a remote tool.
pub fn definition_from_schema(name: &str, description: Option<&str>, schema: &Value) -> ToolDefinition {
    parameters_from_schema(schema).into_iter().fold(
        ToolDefinition::new(name, description.unwrap_or_default()),
        ToolDefinition::with_parameter,
    )
}
