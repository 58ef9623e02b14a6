//! Tool invocation errors

use super::arguments::ArgumentError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single tool invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] ArgumentError),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),
}

impl ToolError {
    pub fn execution_failed(message: impl Into<String>) -> Self {
        ToolError::ExecutionFailed(message.into())
    }
}
