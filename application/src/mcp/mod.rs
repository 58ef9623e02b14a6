//! MCP client sessions and remote tool adaptation

pub mod manager;
pub mod tool;

pub use manager::{McpClient, McpClientManager, ToolsListing};
pub use tool::{McpToolHandler, adapt_remote_tool};
