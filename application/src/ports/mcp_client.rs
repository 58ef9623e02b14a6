//! MCP client port
//!
//! [`McpConnector`] opens sessions; [`McpClientSession`] is one live
//! protocol session. Transport implementations (stdio, SSE, streamable
//! HTTP) live in the infrastructure layer.

use aicli_domain::McpSettings;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from MCP sessions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    #[error("MCP connection closed")]
    ConnectionClosed,

    #[error("MCP request timed out after {0:?}")]
    Timeout(Duration),

    #[error("MCP connection failed: {0}")]
    ConnectFailed(String),

    #[error("MCP transport error: {0}")]
    Transport(String),

    #[error("MCP server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("MCP protocol error: {0}")]
    Protocol(String),
}

impl McpError {
    pub fn is_closed(&self) -> bool {
        matches!(self, McpError::ConnectionClosed)
    }
}

/// A tool as advertised by an MCP server
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTool {
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema of the tool arguments
    pub input_schema: Value,
}

/// One live MCP protocol session.
///
/// After [`close`](McpClientSession::close) every call fails with
/// [`McpError::ConnectionClosed`]. Closing twice is not an error.
#[async_trait]
pub trait McpClientSession: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, McpError>;

    /// Call a remote tool; returns the structured result.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError>;

    async fn ping(&self) -> Result<(), McpError>;

    async fn close(&self) -> Result<(), McpError>;

    fn is_closed(&self) -> bool;
}

/// Opens MCP sessions from provider settings
#[async_trait]
pub trait McpConnector: Send + Sync {
    /// Connect and complete the initialize handshake.
    ///
    /// Subprocess transports are bound to `cancel`: cancelling it terminates
    /// the child.
    async fn connect(
        &self,
        provider: &str,
        settings: &McpSettings,
        cancel: CancellationToken,
    ) -> Result<Arc<dyn McpClientSession>, McpError>;
}
