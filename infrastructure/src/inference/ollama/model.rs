//! Streaming chat model over Ollama's `/api/chat`

use super::types::{ChatChunk, ChatMessage, ChatRequest, ChatTool};
use aicli_application::{ChatModel, ModelError, StreamHandle};
use aicli_domain::{Message, StreamEvent, ToolCallRequest, ToolDefinition};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Buffered stream events per model step
const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    tools: Vec<ToolDefinition>,
}

impl OllamaChatModel {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            tools: Vec::new(),
        }
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    fn request_body<'a>(&'a self, messages: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: messages.iter().filter_map(ChatMessage::from_message).collect(),
            stream: true,
            tools: self.tools.iter().map(ChatTool::from_definition).collect(),
        }
    }
}

/// Translate one NDJSON line into stream events.
///
/// `next_call` numbers synthesized tool call ids within the step.
pub fn chunk_events(line: &str, next_call: &mut usize) -> Vec<StreamEvent> {
    let chunk: ChatChunk = match serde_json::from_str(line) {
        Ok(chunk) => chunk,
        Err(e) => return vec![StreamEvent::Error(format!("invalid response chunk: {e}"))],
    };
    if let Some(error) = chunk.error {
        return vec![StreamEvent::Error(error)];
    }

    let mut events = Vec::new();
    if let Some(message) = chunk.message {
        if !message.content.is_empty() {
            events.push(StreamEvent::Delta(message.content));
        }
        for call in message.tool_calls {
            *next_call += 1;
            let arguments = if call.function.arguments.is_null() {
                "{}".to_string()
            } else {
                call.function.arguments.to_string()
            };
            events.push(StreamEvent::ToolCall(ToolCallRequest::new(
                format!("call_{next_call}"),
                call.function.name,
                arguments,
            )));
        }
    }
    if chunk.done {
        events.push(StreamEvent::Completed);
    }
    events
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn with_tools(&self, tools: &[ToolDefinition]) -> Result<Arc<dyn ChatModel>, ModelError> {
        Ok(Arc::new(Self {
            tools: tools.to_vec(),
            ..self.clone()
        }))
    }

    async fn stream(&self, messages: &[Message]) -> Result<StreamHandle, ModelError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, tools = self.tools.len(), "Sending Ollama chat request");

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| ModelError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => {
                    ModelError::ModelNotAvailable(format!("{}: {body}", self.model))
                }
                _ => ModelError::RequestFailed(format!("HTTP {status}: {body}")),
            });
        }

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            let mut next_call = 0;

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        warn!(error = %e, "Ollama stream failed");
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let line = String::from_utf8_lossy(&line);
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    trace!("Ollama chunk: {line}");
                    for event in chunk_events(line, &mut next_call) {
                        let terminal = event.is_terminal();
                        if tx.send(event).await.is_err() || terminal {
                            return;
                        }
                    }
                }
            }

            let rest = String::from_utf8_lossy(&buffer).trim().to_string();
            if !rest.is_empty() {
                for event in chunk_events(&rest, &mut next_call) {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, serve};
    use aicli_domain::ToolParameter;

    #[test]
    fn test_chunk_events_text_and_done() {
        let mut calls = 0;
        assert_eq!(
            chunk_events(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#, &mut calls),
            vec![StreamEvent::Delta("Hi".into())]
        );
        assert_eq!(
            chunk_events(r#"{"message":{"role":"assistant","content":""},"done":true}"#, &mut calls),
            vec![StreamEvent::Completed]
        );
    }

    #[test]
    fn test_chunk_events_tool_calls() {
        let mut calls = 0;
        let events = chunk_events(
            r#"{"message":{"role":"assistant","content":"","tool_calls":[{"function":{"name":"file_list","arguments":{"directory":"/tmp"}}},{"function":{"name":"toolset_enable","arguments":{"toolsets":"github"}}}]},"done":false}"#,
            &mut calls,
        );

        assert_eq!(
            events,
            vec![
                StreamEvent::ToolCall(ToolCallRequest::new("call_1", "file_list", r#"{"directory":"/tmp"}"#)),
                StreamEvent::ToolCall(ToolCallRequest::new(
                    "call_2",
                    "toolset_enable",
                    r#"{"toolsets":"github"}"#
                )),
            ]
        );
    }

    #[test]
    fn test_chunk_events_error() {
        let mut calls = 0;
        assert_eq!(
            chunk_events(r#"{"error":"model 'x' not found"}"#, &mut calls),
            vec![StreamEvent::Error("model 'x' not found".into())]
        );
        assert!(matches!(chunk_events("garbage", &mut calls)[0], StreamEvent::Error(_)));
    }

    #[test]
    fn test_request_body_skips_error_messages() {
        let model = OllamaChatModel::new(reqwest::Client::new(), "http://localhost:11434", "llama3.2:3b");
        let definition = ToolDefinition::new("file_list", "List files")
            .with_parameter(ToolParameter::new("directory", "Directory", false));
        let model = OllamaChatModel {
            tools: vec![definition],
            ..model
        };
        let messages = vec![
            Message::system("Be brief"),
            Message::user("Hello"),
            Message::error("boom"),
            Message::tool("[]", "file_list"),
        ];

        let body = serde_json::to_value(model.request_body(&messages)).unwrap();

        let roles: Vec<_> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "tool"]);
        assert_eq!(body["messages"][2]["tool_name"], "file_list");
        assert_eq!(body["stream"], true);
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "file_list");
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_request_body_replays_tool_call_turns() {
        let model = OllamaChatModel::new(reqwest::Client::new(), "http://localhost:11434", "llama3.2:3b");
        let call = ToolCallRequest::new("call_0", "file_list", r#"{"directory":"/tmp"}"#);
        let messages = vec![
            Message::user("What is in /tmp?"),
            Message::assistant_tool_calls("", vec![call.clone()]),
            Message::tool_result("[]", &call),
        ];

        let body = serde_json::to_value(model.request_body(&messages)).unwrap();

        let turn = &body["messages"][1];
        assert_eq!(turn["role"], "assistant");
        assert_eq!(turn["tool_calls"][0]["function"]["name"], "file_list");
        assert_eq!(turn["tool_calls"][0]["function"]["arguments"]["directory"], "/tmp");
        assert_eq!(body["messages"][2]["role"], "tool");
        assert!(body["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn test_with_tools_returns_bound_copy() {
        let model = OllamaChatModel::new(reqwest::Client::new(), "http://localhost:11434", "llama3.2:3b");
        let bound = model
            .with_tools(&[ToolDefinition::new("file_list", "List files")])
            .unwrap();

        assert_eq!(bound.name(), "llama3.2:3b");
        assert!(model.tools().is_empty());
    }

    #[tokio::test]
    async fn test_stream_from_server() {
        let (base, captured) = serve(1, |_| {
            Reply::ok(
                "application/x-ndjson",
                concat!(
                    "{\"message\":{\"role\":\"assistant\",\"content\":\"Hello, \"},\"done\":false}\n",
                    "{\"message\":{\"role\":\"assistant\",\"content\":\"I am here!\"},\"done\":false}\n",
                    "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
                ),
            )
        })
        .await;
        let model = OllamaChatModel::new(reqwest::Client::new(), base, "llama3.2:3b");

        let text = model.generate(&[Message::user("Hello")]).await.unwrap();

        assert_eq!(text, "Hello, I am here!");
        let captured = captured.lock().unwrap();
        assert_eq!(captured[0].request_line(), "POST /api/chat HTTP/1.1");
        assert_eq!(captured[0].body["model"], "llama3.2:3b");
        assert_eq!(captured[0].body["messages"][0]["content"], "Hello");
    }

    #[tokio::test]
    async fn test_stream_unreachable_server() {
        let model = OllamaChatModel::new(reqwest::Client::new(), "http://127.0.0.1:9", "llama3.2:3b");
        let err = model.stream(&[Message::user("Hello")]).await.err().unwrap();
        assert!(matches!(err, ModelError::ConnectionError(_)));
    }
}
