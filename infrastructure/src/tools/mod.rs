//! Tools providers
//!
//! - [`FsToolsProvider`]: in-process filesystem tools
//! - [`GithubToolsProvider`]: GitHub MCP server in a container
//! - [`ConfiguredMcpProvider`]: MCP servers declared in configuration

pub mod configured;
pub mod fs;
pub mod github;

pub use configured::ConfiguredMcpProvider;
pub use fs::FsToolsProvider;
pub use github::GithubToolsProvider;
