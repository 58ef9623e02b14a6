//! Execution parameters for the agent loop.
//!
//! [`ExecutionParams`] groups the static parameters that bound one
//! conversation round in
//! [`ConversationAgent`](crate::use_cases::run_agent::ConversationAgent).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Agent loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum model steps (model call + tool calls) in a single round.
    pub max_steps: usize,
    /// Upper bound for a single tool invocation.
    pub tool_timeout: Option<Duration>,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_steps: 50,
            tool_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl ExecutionParams {
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_steps, 50);
        assert_eq!(params.tool_timeout, Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_max_steps(3)
            .with_tool_timeout(None);

        assert_eq!(params.max_steps, 3);
        assert!(params.tool_timeout.is_none());
    }
}
