//! Agent execution progress port.
//!
//! [`AgentProgressNotifier`] is an **output port** that the presentation layer
//! implements to display agent activity while a round runs.
//!
//! Every tool invocation is reported through the same pair of callbacks,
//! whether the tool was bound when the agent was built or was routed
//! through the tool manager afterwards.

use aicli_domain::ToolError;

/// Progress notifier for agent execution.
///
/// All methods have default no-op implementations, so implementers only
/// need to override the callbacks they care about.
pub trait AgentProgressNotifier: Send + Sync {
    /// Called before each model step
    fn on_model_step(&self, _step: usize) {}

    /// Called for each text chunk received while streaming
    fn on_llm_chunk(&self, _chunk: &str) {}

    /// Called when a tool invocation starts
    fn on_tool_call_start(&self, _tool_name: &str, _arguments: &str) {}

    /// Called when a tool invocation ends
    fn on_tool_call_end(&self, _tool_name: &str, _result: Result<&str, &ToolError>) {}

    /// Called when a round finishes (successfully or not)
    fn on_round_complete(&self) {}
}

/// No-op progress notifier
pub struct NoAgentProgress;

impl AgentProgressNotifier for NoAgentProgress {}
