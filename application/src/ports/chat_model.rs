//! Chat model port
//!
//! Defines the interface for talking to a language model, optionally bound
//! to a set of tool descriptors.

use aicli_domain::{Message, StreamEvent, ToolCallRequest, ToolDefinition};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during model operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("{0}")]
    Other(String),
}

/// Handle for receiving streaming events from one model step.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// A handle that replays a fixed list of events.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream, collecting text and tool calls.
    pub async fn collect(mut self) -> Result<(String, Vec<ToolCallRequest>), ModelError> {
        let mut text = String::new();
        let mut calls = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => text.push_str(&chunk),
                StreamEvent::ToolCall(call) => calls.push(call),
                StreamEvent::Completed => break,
                StreamEvent::Error(e) => return Err(ModelError::RequestFailed(e)),
            }
        }
        // Channel closed without Completed, return what we have
        Ok((text, calls))
    }
}

/// A language model.
///
/// Implementations are immutable: [`with_tools`](ChatModel::with_tools)
/// returns a new model bound to the given tools.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier (e.g. "llama3.2")
    fn name(&self) -> &str;

    /// Returns a copy of this model bound to `tools`.
    fn with_tools(&self, tools: &[ToolDefinition]) -> Result<Arc<dyn ChatModel>, ModelError>;

    /// Generate one step over `messages`, streaming the result.
    async fn stream(&self, messages: &[Message]) -> Result<StreamHandle, ModelError>;

    /// Generate one step and wait for the complete text.
    async fn generate(&self, messages: &[Message]) -> Result<String, ModelError> {
        let (text, _) = self.stream(messages).await?.collect().await?;
        Ok(text)
    }
}
