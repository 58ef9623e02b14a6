//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. Conversion methods turn
//! them into the domain and application inputs that discovery and the
//! agent consume.

mod agent;
mod inference;
mod mcp;

pub use agent::FileAgentConfig;
pub use inference::{FileInferenceConfig, FileOllamaConfig};
pub use mcp::{FileMcpConfig, FileMcpServerConfig};

use crate::inference::OllamaSettings;
use aicli_application::ExecutionParams;
use aicli_domain::{DiscoveryConfig, FeatureSettings, McpSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("failed to read policies file {path}: {source}")]
    PoliciesRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policies file {path}: {source}")]
    PoliciesParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid MCP server '{name}': {message}")]
    InvalidMcpServer { name: String, message: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub inference: FileInferenceConfig,
    /// Per inference provider settings
    pub inferences: BTreeMap<String, FeatureSettings>,
    /// Per tools provider settings
    pub tools: BTreeMap<String, FeatureSettings>,
    pub mcp: FileMcpConfig,
    pub agent: FileAgentConfig,
}

impl FileConfig {
    pub fn to_discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            inference: self.inference.name.clone(),
            model: self.inference.model.clone(),
            inferences: self.inferences.clone(),
            tools: self.tools.clone(),
        }
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        self.agent.to_execution_params()
    }

    pub fn ollama_settings(&self) -> OllamaSettings {
        let selected = self.inference.name.as_deref().is_none_or(|n| n == crate::inference::ollama::OLLAMA_PROVIDER);
        OllamaSettings {
            base_url: self.inference.ollama.base_url.clone(),
            model: selected.then(|| self.inference.model.clone()).flatten(),
        }
    }

    /// Configured MCP servers as `(name, description, settings)`.
    ///
    /// Fails on the first invalid entry.
    pub fn mcp_servers(&self) -> Result<Vec<(String, Option<String>, McpSettings)>, ConfigError> {
        self.mcp
            .servers
            .iter()
            .map(|(name, server)| {
                let settings = server.to_settings().map_err(|e| ConfigError::InvalidMcpServer {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
                Ok((name.clone(), server.description.clone(), settings))
            })
            .collect()
    }
}
