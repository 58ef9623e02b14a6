//! Type definitions for the conversation agent.

use crate::ports::chat_model::ModelError;
use aicli_domain::ToolError;
use thiserror::Error;

/// Errors that end a conversation round
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("tool '{name}' failed: {source}")]
    Tool { name: String, source: ToolError },

    #[error("maximum number of steps ({0}) exceeded")]
    MaxStepsExceeded(usize),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }
}
