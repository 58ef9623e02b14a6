//! ReAct loop for one conversation round
//!
//! Each step reloads the tool binding from the [`ToolManager`], streams the
//! model over the session history and runs the tool calls it requests.
//! The round ends when a step produces no tool calls.

use super::dynamic_model::DynamicToolModel;
use super::session::SharedSession;
use super::types::AgentError;
use crate::config::ExecutionParams;
use crate::ports::agent_progress::AgentProgressNotifier;
use crate::ports::chat_model::{ChatModel, ModelError};
use crate::tools::ToolManager;
use aicli_domain::{Message, StreamEvent, Tool, ToolCallRequest, ToolError};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ReactAgent {
    model: DynamicToolModel,
    tool_manager: Arc<ToolManager>,
    /// Tools bound when the agent was built
    known_tools: BTreeMap<String, Tool>,
    params: ExecutionParams,
}

impl ReactAgent {
    /// Bind the model to the currently enabled tools.
    pub fn build(
        model: Arc<dyn ChatModel>,
        tool_manager: Arc<ToolManager>,
        params: ExecutionParams,
    ) -> Result<Self, AgentError> {
        let tools = tool_manager.enabled_tools();
        let definitions: Vec<_> = tools.iter().map(|t| t.definition().clone()).collect();
        let model = DynamicToolModel::new(model, &definitions)?;
        let known_tools = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();

        Ok(Self {
            model,
            tool_manager,
            known_tools,
            params,
        })
    }

    pub async fn run(
        &self,
        session: &SharedSession,
        progress: &dyn AgentProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        for step in 1..=self.params.max_steps {
            progress.on_model_step(step);
            self.model
                .reload_tools(&self.tool_manager.enabled_definitions())?;

            let calls = self.stream_step(session, progress, cancel).await?;
            if calls.is_empty() {
                debug!(step, "Round complete");
                return Ok(());
            }

            session.commit_tool_calls(calls.clone());
            for call in &calls {
                let output = self.call_tool(call, progress, cancel).await?;
                session.push(Message::tool_result(output, call));
            }
        }

        warn!(max_steps = self.params.max_steps, "Step limit reached");
        Err(AgentError::MaxStepsExceeded(self.params.max_steps))
    }

    /// Stream one model step into the session, returning requested tool calls
    async fn stream_step(
        &self,
        session: &SharedSession,
        progress: &dyn AgentProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<Vec<ToolCallRequest>, AgentError> {
        let input = session.model_input();
        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            stream = self.model.stream(&input) => stream?,
        };

        let mut calls = Vec::new();
        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
                event = stream.recv() => event,
            };
            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    progress.on_llm_chunk(&chunk);
                    session.append_partial(&chunk);
                }
                Some(StreamEvent::ToolCall(call)) => calls.push(call),
                Some(StreamEvent::Error(e)) => return Err(ModelError::RequestFailed(e).into()),
                Some(StreamEvent::Completed) | None => break,
            }
        }
        Ok(calls)
    }

    /// Invoke one requested tool.
    ///
    /// Names unknown at build time (toolsets enabled during this round) go
    /// through [`ToolManager::invoke_tool`]. Both paths report progress.
    /// Argument errors are returned to the model as text; any other failure
    /// ends the round.
    async fn call_tool(
        &self,
        call: &ToolCallRequest,
        progress: &dyn AgentProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        progress.on_tool_call_start(&call.name, &call.arguments);

        let invocation = async {
            match self.known_tools.get(&call.name) {
                Some(tool) => tool.invoke(&call.arguments).await,
                None => {
                    debug!(tool = %call.name, "Routing tool through tool manager");
                    self.tool_manager
                        .invoke_tool(&call.name, &call.arguments)
                        .await
                }
            }
        };
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            result = with_timeout(self.params.tool_timeout, invocation) => result,
        };

        progress.on_tool_call_end(&call.name, result.as_deref());
        match result {
            Ok(output) => {
                info!(tool = %call.name, "Tool call succeeded");
                Ok(output)
            }
            Err(ToolError::InvalidArguments(e)) => {
                debug!(tool = %call.name, error = %e, "Invalid tool arguments");
                Ok(format!("Invalid arguments for tool '{}': {e}", call.name))
            }
            Err(source) => Err(AgentError::Tool {
                name: call.name.clone(),
                source,
            }),
        }
    }
}

async fn with_timeout<F>(limit: Option<Duration>, invocation: F) -> Result<String, ToolError>
where
    F: Future<Output = Result<String, ToolError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, invocation)
            .await
            .unwrap_or_else(|_| Err(ToolError::Timeout(limit))),
        None => invocation.await,
    }
}
