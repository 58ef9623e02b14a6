//! Application layer for ai-cli
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod mcp;
pub mod ports;
pub mod registry;
pub mod tools;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use mcp::{McpClient, McpClientManager, ToolsListing};
pub use ports::{
    agent_progress::{AgentProgressNotifier, NoAgentProgress},
    chat_model::{ChatModel, ModelError, StreamHandle},
    feature_provider::{Feature, InferenceProvider, ProviderError, ProviderOptions, ToolsProvider},
    mcp_client::{McpClientSession, McpConnector, McpError, RemoteTool},
};
pub use registry::FeatureRegistry;
pub use tools::{TOOLSET_ENABLE, ToolManager};
pub use use_cases::discover_features::{DiscoverFeaturesUseCase, Features};
pub use use_cases::run_agent::{AgentError, ConversationAgent, SharedSession};
