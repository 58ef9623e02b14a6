//! Feature provider ports
//!
//! Inference providers and tools providers share the [`Feature`] contract:
//! static attributes plus an availability probe. Discovery calls
//! [`Feature::initialize`] only for providers that policy allows, then
//! reads [`Feature::is_available`] and [`Feature::reason`].
//!
//! ```text
//!                  ┌──────────────┐
//!                  │   Feature    │  attributes / initialize / is_available / reason
//!                  └──────┬───────┘
//!              ┌──────────┴──────────┐
//!     ┌────────▼─────────┐  ┌────────▼────────┐
//!     │InferenceProvider │  │  ToolsProvider  │
//!     │ models           │  │ get_tools       │
//!     │ get_inference    │  │ mcp_settings    │
//!     └──────────────────┘  └─────────────────┘
//! ```

use super::chat_model::{ChatModel, ModelError};
use aicli_domain::{EffectivePolicy, FeatureAttributes, McpSettings, Tool};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in feature provider operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not available: {0}")]
    NotAvailable(String),

    #[error("Tool discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Safety options resolved from policy and configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderOptions {
    pub read_only: bool,
    pub non_destructive: bool,
    pub local: bool,
}

impl ProviderOptions {
    pub fn from_policy(policy: &EffectivePolicy) -> Self {
        Self {
            read_only: policy.read_only.value,
            non_destructive: policy.non_destructive.value,
            local: policy.local.value,
        }
    }
}

/// Common contract of every discoverable feature
#[async_trait]
pub trait Feature: Send + Sync {
    fn attributes(&self) -> &FeatureAttributes;

    /// Probe the environment. May be expensive (network, subprocess lookup).
    async fn initialize(&self, options: &ProviderOptions);

    fn is_available(&self) -> bool;

    /// Human-readable explanation of the availability state
    fn reason(&self) -> String;

    fn name(&self) -> &str {
        &self.attributes().name
    }
}

/// A provider of invokable tools (a toolset)
#[async_trait]
pub trait ToolsProvider: Feature {
    /// Local tools implemented in-process.
    async fn get_tools(&self) -> Result<Vec<Tool>, ProviderError> {
        Ok(Vec::new())
    }

    /// Connection settings when the tools live on an MCP server.
    fn mcp_settings(&self) -> Option<McpSettings> {
        None
    }
}

/// A language-model backend
#[async_trait]
pub trait InferenceProvider: Feature {
    /// Models offered by the provider, as found by the last probe
    fn models(&self) -> Vec<String>;

    fn system_prompt(&self) -> Option<String> {
        None
    }

    /// Build a model client. `model` overrides the provider's default.
    async fn get_inference(&self, model: Option<&str>) -> Result<Arc<dyn ChatModel>, ModelError>;
}
