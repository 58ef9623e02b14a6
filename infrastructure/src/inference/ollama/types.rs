//! Ollama REST API wire types

use aicli_domain::{Message, Role, ToolCallRequest, ToolDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /api/tags` response
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
pub struct TagsModel {
    pub name: String,
}

/// `POST /api/chat` request body
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ChatTool<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ChatToolCall<'a>>,
}

/// A previously requested call, replayed in an assistant message
#[derive(Debug, Serialize)]
pub struct ChatToolCall<'a> {
    pub function: ChatToolCallFunction<'a>,
}

#[derive(Debug, Serialize)]
pub struct ChatToolCallFunction<'a> {
    pub name: &'a str,
    pub arguments: Value,
}

impl<'a> ChatToolCall<'a> {
    /// Ollama expects the arguments as an object; unparsable text becomes `{}`
    pub fn from_request(call: &'a ToolCallRequest) -> Self {
        let arguments = serde_json::from_str::<Value>(&call.arguments)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        Self {
            function: ChatToolCallFunction {
                name: &call.name,
                arguments,
            },
        }
    }
}

impl<'a> ChatMessage<'a> {
    /// `None` for roles the model never sees
    pub fn from_message(message: &'a Message) -> Option<Self> {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Error => return None,
        };
        Some(Self {
            role,
            content: &message.text,
            tool_name: message.tool_name.as_deref(),
            tool_calls: message.tool_calls.iter().map(ChatToolCall::from_request).collect(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChatTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ChatFunction<'a>,
}

#[derive(Debug, Serialize)]
pub struct ChatFunction<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: Value,
}

impl<'a> ChatTool<'a> {
    pub fn from_definition(definition: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: ChatFunction {
                name: &definition.name,
                description: &definition.description,
                parameters: definition.input_schema(),
            },
        }
    }
}

/// One NDJSON line of a streamed `/api/chat` response
#[derive(Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ChunkToolCall>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkToolCall {
    pub function: ChunkFunction,
}

#[derive(Debug, Deserialize)]
pub struct ChunkFunction {
    pub name: String,
    /// Ollama sends arguments as a JSON object, not a string
    #[serde(default)]
    pub arguments: Value,
}
