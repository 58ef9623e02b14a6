//! Infrastructure layer for ai-cli
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration loading, the Ollama
//! inference provider, the built-in tools providers and the MCP
//! client transports.

pub mod config;
pub mod inference;
pub mod mcp;
pub mod tools;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use inference::{OllamaChatModel, OllamaProvider, OllamaSettings};
pub use mcp::{DEFAULT_REQUEST_TIMEOUT, McpSession, TransportConnector};
pub use tools::{ConfiguredMcpProvider, FsToolsProvider, GithubToolsProvider};
