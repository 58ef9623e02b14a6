//! JSON-RPC 2.0 message types for the Model Context Protocol.
//!
//! - **Requests**: client → server (`initialize`, `tools/list`, `tools/call`, `ping`)
//! - **Notifications**: client → server (`notifications/initialized`)
//! - **Responses**: server → client (result or error, correlated by `id`)
//!
//! Servers may also send their own requests and notifications; the
//! transports classify every inbound frame with [`classify_message`] and
//! only route responses.

use aicli_application::{McpError, RemoteTool};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

/// Protocol revision offered during `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";
pub const METHOD_PING: &str = "ping";

pub const CLIENT_NAME: &str = "ai-cli";

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a new request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC notification (no `id`, no response)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// The `result` payload, or the server's error.
    pub fn into_result(self) -> Result<Value, McpError> {
        if let Some(error) = self.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

/// Kind of an inbound JSON-RPC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Reply to one of our requests (`id`, no `method`)
    Response { id: u64 },
    /// Server-initiated request (`id` + `method`)
    IncomingRequest,
    /// Server notification (`method`, no `id`)
    Notification,
    /// Neither shape
    Invalid,
}

/// Classify a frame by its `id` and `method` fields.
pub fn classify_message(json: &Value) -> MessageKind {
    let id = json.get("id").and_then(Value::as_u64);
    let method = json.get("method").and_then(Value::as_str);

    match (id, method) {
        (Some(_), Some(_)) => MessageKind::IncomingRequest,
        (Some(id), None) => MessageKind::Response { id },
        (None, Some(_)) => MessageKind::Notification,
        (None, None) => MessageKind::Invalid,
    }
}

/// Parse an inbound frame, returning it only when it is a response.
pub fn parse_response(raw: &str) -> Result<Option<JsonRpcResponse>, McpError> {
    let json: Value =
        serde_json::from_str(raw).map_err(|e| McpError::Protocol(format!("invalid JSON: {e}")))?;
    match classify_message(&json) {
        MessageKind::Response { .. } => serde_json::from_value(json)
            .map(Some)
            .map_err(|e| McpError::Protocol(format!("invalid response: {e}"))),
        _ => Ok(None),
    }
}

/// `initialize` request parameters
pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": CLIENT_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// The protocol version the server answered `initialize` with.
pub fn negotiated_version(result: &Value) -> Option<&str> {
    result.get("protocolVersion").and_then(Value::as_str)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedTool {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_schema: Option<Value>,
}

/// One page of a `tools/list` result
#[derive(Debug)]
pub struct ToolsPage {
    pub tools: Vec<RemoteTool>,
    pub next_cursor: Option<String>,
}

pub fn tools_list_params(cursor: Option<&str>) -> Option<Value> {
    cursor.map(|cursor| json!({ "cursor": cursor }))
}

pub fn parse_tools_page(result: Value) -> Result<ToolsPage, McpError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Page {
        #[serde(default)]
        tools: Vec<ListedTool>,
        #[serde(default)]
        next_cursor: Option<String>,
    }

    let page: Page = serde_json::from_value(result)
        .map_err(|e| McpError::Protocol(format!("invalid tools/list result: {e}")))?;
    Ok(ToolsPage {
        tools: page
            .tools
            .into_iter()
            .map(|tool| RemoteTool {
                name: tool.name,
                description: tool.description,
                input_schema: tool
                    .input_schema
                    .unwrap_or_else(|| json!({ "type": "object" })),
            })
            .collect(),
        next_cursor: page.next_cursor.filter(|cursor| !cursor.is_empty()),
    })
}

pub fn tools_call_params(name: &str, arguments: Value) -> Value {
    json!({ "name": name, "arguments": arguments })
}
