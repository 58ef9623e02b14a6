//! Tool domain entities

use super::arguments::ToolArguments;
use super::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supported parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
        }
    }

    /// Maps a JSON Schema `type` to a supported parameter type.
    ///
    /// Unknown types are treated as strings.
    pub fn from_json_type(json_type: &str) -> Self {
        match json_type {
            "number" => ParameterType::Number,
            "integer" => ParameterType::Integer,
            "boolean" => ParameterType::Boolean,
            "array" => ParameterType::Array,
            "object" => ParameterType::Object,
            _ => ParameterType::String,
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single tool parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub param_type: ParameterType,
    pub required: bool,
    /// Allowed values, advertised as a JSON Schema `enum`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    /// Property schema as declared by a remote tool, advertised verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: ParameterType::String,
            required,
            allowed: Vec::new(),
            schema: None,
        }
    }

    pub fn with_type(mut self, param_type: ParameterType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// JSON Schema of this parameter
    pub fn property_schema(&self) -> serde_json::Value {
        if let Some(schema) = &self.schema {
            return schema.clone();
        }
        let mut property = serde_json::json!({
            "type": self.param_type.as_str(),
            "description": self.description,
        });
        if !self.allowed.is_empty() {
            property["enum"] = serde_json::json!(self.allowed);
        }
        property
    }
}

/// Descriptor of a tool as presented to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "file_list")
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON Schema object describing the parameters.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(param.name.clone(), param.property_schema());
            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Invocation backend of a tool.
///
/// Receives the raw JSON argument string produced by the model.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, definition: &ToolDefinition, arguments: &str) -> Result<String, ToolError>;
}

/// An invokable tool, owned by exactly one tools provider
#[derive(Clone)]
pub struct Tool {
    definition: ToolDefinition,
    provider: String,
    handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        definition: ToolDefinition,
        provider: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            definition,
            provider: provider.into(),
            handler,
        }
    }

    /// Wraps an in-process function. Arguments are decoded and validated
    /// against the definition before the function runs.
    pub fn local<F>(definition: ToolDefinition, provider: impl Into<String>, function: F) -> Self
    where
        F: Fn(&ToolArguments) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::new(definition, provider, Arc::new(LocalHandler(function)))
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn description(&self) -> &str {
        &self.definition.description
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Name of the owning tools provider (the toolset)
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub async fn invoke(&self, arguments: &str) -> Result<String, ToolError> {
        self.handler.invoke(&self.definition, arguments).await
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.definition.name)
            .field("provider", &self.provider)
            .finish()
    }
}

struct LocalHandler<F>(F);

#[async_trait]
impl<F> ToolHandler for LocalHandler<F>
where
    F: Fn(&ToolArguments) -> Result<String, ToolError> + Send + Sync,
{
    async fn invoke(&self, definition: &ToolDefinition, arguments: &str) -> Result<String, ToolError> {
        let arguments = ToolArguments::decode(definition, arguments)?;
        (self.0)(&arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::arguments::ArgumentError;

    fn echo_definition() -> ToolDefinition {
        ToolDefinition::new("echo", "Echo the input back")
            .with_parameter(ToolParameter::new("text", "Text to echo", true))
            .with_parameter(
                ToolParameter::new("times", "Repetitions", false).with_type(ParameterType::Integer),
            )
    }

    fn echo_tool() -> Tool {
        Tool::local(echo_definition(), "test", |args| {
            let text = args.require_str("text")?;
            let times = args.get_integer("times").unwrap_or(1);
            Ok(text.repeat(times.max(0) as usize))
        })
    }

    #[test]
    fn test_input_schema() {
        let schema = echo_definition().input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["properties"]["times"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["text"]));
    }

    #[test]
    fn test_parameter_type_from_json_type() {
        assert_eq!(ParameterType::from_json_type("integer"), ParameterType::Integer);
        assert_eq!(ParameterType::from_json_type("boolean"), ParameterType::Boolean);
        assert_eq!(ParameterType::from_json_type("array"), ParameterType::Array);
        assert_eq!(ParameterType::from_json_type("object"), ParameterType::Object);
        assert_eq!(ParameterType::from_json_type("null"), ParameterType::String);
    }

    #[test]
    fn test_input_schema_enum_and_declared_schema() {
        let labels = serde_json::json!({"type": "array", "items": {"type": "string"}});
        let definition = ToolDefinition::new("tag", "Tag an issue")
            .with_parameter(ToolParameter::new("kind", "Kind", true).with_allowed(["bug", "feature"]))
            .with_parameter(
                ToolParameter::new("labels", "", false)
                    .with_type(ParameterType::Array)
                    .with_schema(labels.clone()),
            );

        let schema = definition.input_schema();

        assert_eq!(schema["properties"]["kind"]["enum"], serde_json::json!(["bug", "feature"]));
        assert_eq!(schema["properties"]["labels"], labels);
        assert!(schema["properties"]["labels"].get("enum").is_none());
    }

    #[tokio::test]
    async fn test_local_tool_invocation() {
        let tool = echo_tool();
        assert_eq!(tool.name(), "echo");
        assert_eq!(tool.provider(), "test");

        let output = tool.invoke(r#"{"text":"ab","times":2}"#).await.unwrap();
        assert_eq!(output, "abab");
    }

    #[tokio::test]
    async fn test_local_tool_rejects_invalid_arguments() {
        let tool = echo_tool();
        let err = tool.invoke("{}").await.unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments(ArgumentError::MissingRequired("text".to_string()))
        );
    }
}
