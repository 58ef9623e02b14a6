//! Streaming events for model responses.
//!
//! A model step is consumed as a sequence of [`StreamEvent`]s: text deltas
//! and tool call requests, terminated by `Completed` or `Error`.

use serde::{Deserialize, Serialize};

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned call ID (may be synthesized when absent)
    pub id: String,
    pub name: String,
    /// Raw JSON object string
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// An event in a streaming model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk
    Delta(String),
    /// A complete tool call request
    ToolCall(ToolCallRequest),
    /// End of the step
    Completed,
    /// The stream failed
    Error(String),
}

impl StreamEvent {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::Completed.is_terminal());
        assert!(StreamEvent::Error("x".into()).is_terminal());
        assert!(!StreamEvent::Delta("x".into()).is_terminal());
        assert!(!StreamEvent::ToolCall(ToolCallRequest::new("1", "t", "{}")).is_terminal());
    }

    #[test]
    fn test_text() {
        assert_eq!(StreamEvent::Delta("hi".into()).text(), Some("hi"));
        assert_eq!(StreamEvent::Completed.text(), None);
    }
}
