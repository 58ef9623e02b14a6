//! CLI command definitions

use aicli_domain::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for the discovery report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Human-readable listing
    #[default]
    Text,
    /// Indented JSON
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Probe inference and tools providers and print what is usable
    Discover {
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputArg,
    },
    /// Start an interactive conversation (default)
    Chat,
}

/// CLI arguments for ai-cli
#[derive(Parser, Debug)]
#[command(name = "ai-cli")]
#[command(author, version, about = "Terminal AI agent with local inference and MCP tools")]
#[command(long_about = r#"
ai-cli discovers the inference providers and tools available on this
machine, applies your policies, and runs a conversational agent that can
call those tools.

Configuration files are loaded from (in priority order):
1. AI_CLI_* environment variables
2. --config <path>     Explicit config file
3. ./ai-cli.toml       Project-level config
4. ~/.config/ai-cli/config.toml   Global config

Policies are read from --policies <path> or ~/.config/ai-cli/policies.toml.

Example:
  ai-cli discover --output json
  ai-cli chat
  ai-cli -vv --log-file /tmp/ai-cli.log
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Path to the policies file
    #[arg(long, global = true, value_name = "PATH")]
    pub policies: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The subcommand to run, `chat` when none is given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}
