//! Configuration file loading for ai-cli
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AI_CLI_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./ai-cli.toml` or `./.ai-cli.toml`
//! 4. Global: `$CONFIG_DIR/ai-cli/config.toml`
//! 5. Default values
//!
//! The policy document is separate: `--policies <path>`, else
//! `$CONFIG_DIR/ai-cli/policies.toml` when present.

mod file_config;
mod loader;

pub use file_config::{
    ConfigError, FileAgentConfig, FileConfig, FileInferenceConfig, FileMcpConfig,
    FileMcpServerConfig, FileOllamaConfig,
};
pub use loader::ConfigLoader;
