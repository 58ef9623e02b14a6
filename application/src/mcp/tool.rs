//! Adapts remote MCP tools to local [`Tool`]s

use crate::ports::mcp_client::{McpClientSession, McpError, RemoteTool};
use aicli_domain::mcp::definition_from_schema;
use aicli_domain::{ArgumentError, Tool, ToolDefinition, ToolError, ToolHandler};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Forwards invocations to a remote tool over an MCP session
pub struct McpToolHandler {
    provider: String,
    remote_name: String,
    session: Arc<dyn McpClientSession>,
}

impl McpToolHandler {
    pub fn new(
        provider: impl Into<String>,
        remote_name: impl Into<String>,
        session: Arc<dyn McpClientSession>,
    ) -> Self {
        Self {
            provider: provider.into(),
            remote_name: remote_name.into(),
            session,
        }
    }

    fn map_error(&self, error: McpError) -> ToolError {
        match error {
            McpError::ConnectionClosed => ToolError::ConnectionClosed(self.provider.clone()),
            McpError::Timeout(after) => ToolError::Timeout(after),
            other => ToolError::execution_failed(format!("failed to call mcp tool: {other}")),
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, ArgumentError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_json::from_str(raw).map_err(|e| ArgumentError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(ArgumentError::NotAnObject);
    }
    Ok(value)
}

#[async_trait]
impl ToolHandler for McpToolHandler {
    async fn invoke(&self, _definition: &ToolDefinition, arguments: &str) -> Result<String, ToolError> {
        let arguments = parse_arguments(arguments)?;
        let result = self
            .session
            .call_tool(&self.remote_name, arguments)
            .await
            .map_err(|e| self.map_error(e))?;

        serde_json::to_string(&result)
            .map_err(|e| ToolError::execution_failed(format!("failed to encode mcp result: {e}")))
    }
}

/// Wrap a listed remote tool as a local tool owned by `provider`
pub fn adapt_remote_tool(provider: &str, remote: &RemoteTool, session: Arc<dyn McpClientSession>) -> Tool {
    let definition = definition_from_schema(&remote.name, remote.description.as_deref(), &remote.input_schema);
    Tool::new(
        definition,
        provider,
        Arc::new(McpToolHandler::new(provider, remote.name.clone(), session)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockMcpSession;

    fn remote() -> RemoteTool {
        RemoteTool {
            name: "search_repositories".to_string(),
            description: Some("Search repositories".to_string()),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        }
    }

    #[tokio::test]
    async fn test_adapted_tool_round_trips_through_session() {
        let session = Arc::new(MockMcpSession::new(&["search_repositories"]));
        let tool = adapt_remote_tool("github", &remote(), session);

        assert_eq!(tool.provider(), "github");
        assert!(tool.definition().parameter("query").unwrap().required);

        let result = tool.invoke(r#"{"query": "rust"}"#).await.unwrap();
        let value: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["content"][0]["text"], "test-works");
        assert_eq!(value["tool"], "search_repositories");
        assert_eq!(value["arguments"]["query"], "rust");
    }

    #[tokio::test]
    async fn test_empty_arguments_sent_as_object() {
        let session = Arc::new(MockMcpSession::new(&[]));
        let tool = adapt_remote_tool("github", &remote(), session);

        let result = tool.invoke("").await.unwrap();
        let value: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(value["arguments"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_malformed_arguments() {
        let session = Arc::new(MockMcpSession::new(&[]));
        let tool = adapt_remote_tool("github", &remote(), session);

        let err = tool.invoke("{not json").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(ArgumentError::Malformed(_))));

        let err = tool.invoke("[1, 2]").await.unwrap_err();
        assert_eq!(err, ToolError::InvalidArguments(ArgumentError::NotAnObject));
    }

    #[tokio::test]
    async fn test_closed_session_reports_connection_closed() {
        let session = Arc::new(MockMcpSession::new(&[]));
        let tool = adapt_remote_tool("github", &remote(), session.clone());
        session.close().await.unwrap();

        let err = tool.invoke(r#"{"query": "rust"}"#).await.unwrap_err();

        assert_eq!(err, ToolError::ConnectionClosed("github".to_string()));
        assert!(err.to_string().contains("connection closed"));
    }
}
