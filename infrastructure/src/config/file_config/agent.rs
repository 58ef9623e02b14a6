use aicli_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[agent]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Model steps allowed in one round
    pub max_steps: usize,
    /// Replaces the provider's system prompt when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Per-request timeout for MCP servers
    pub request_timeout_secs: u64,
    /// Upper bound for one tool call; 0 disables it
    pub tool_timeout_secs: u64,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            max_steps: params.max_steps,
            system_prompt: None,
            request_timeout_secs: 60,
            tool_timeout_secs: params.tool_timeout.map_or(0, |t| t.as_secs()),
        }
    }
}

impl FileAgentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        let tool_timeout = (self.tool_timeout_secs > 0).then(|| Duration::from_secs(self.tool_timeout_secs));
        ExecutionParams::default()
            .with_max_steps(self.max_steps.max(1))
            .with_tool_timeout(tool_timeout)
    }
}
