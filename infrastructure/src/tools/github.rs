//! GitHub toolset served by the GitHub MCP server in a container.

use aicli_application::{Feature, ProviderOptions, ToolsProvider};
use aicli_domain::{Availability, FeatureAttributes, McpSettings, ProbeState};
use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

pub const GITHUB_PROVIDER: &str = "github";
pub const ACCESS_TOKEN_ENV_VAR: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

const SERVER_IMAGE: &str = "ghcr.io/github/github-mcp-server";
const SERVER_ENTRYPOINT: &str = "/server/github-mcp-server";

/// Container runtimes in order of preference
const CONTAINER_RUNTIMES: [&str; 2] = ["podman", "docker"];

/// Probe inputs, injectable for tests
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
    fn command_exists(&self, command: &str) -> bool;
}

/// The real process environment and `PATH`
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn command_exists(&self, command: &str) -> bool {
        which::which(command).is_ok()
    }
}

#[derive(Debug, Default)]
struct Resolved {
    runtime: Option<String>,
    token: Option<String>,
    read_only: bool,
}

pub struct GithubToolsProvider {
    attributes: FeatureAttributes,
    environment: Box<dyn Environment>,
    probe: ProbeState,
    resolved: RwLock<Resolved>,
}

impl Default for GithubToolsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubToolsProvider {
    pub fn new() -> Self {
        Self::with_environment(Box::new(SystemEnvironment))
    }

    pub fn with_environment(environment: Box<dyn Environment>) -> Self {
        Self {
            attributes: FeatureAttributes::new(
                GITHUB_PROVIDER,
                "Provides access to GitHub repositories, issues and pull requests through the GitHub MCP server.",
            )
            .with_public(true),
            environment,
            probe: ProbeState::new(),
            resolved: RwLock::new(Resolved::default()),
        }
    }
}

#[async_trait]
impl Feature for GithubToolsProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    async fn initialize(&self, options: &ProviderOptions) {
        let token = self
            .environment
            .var(ACCESS_TOKEN_ENV_VAR)
            .filter(|token| !token.is_empty());
        let runtime = CONTAINER_RUNTIMES
            .iter()
            .find(|runtime| self.environment.command_exists(runtime))
            .map(|runtime| runtime.to_string());
        debug!(runtime = ?runtime, token_set = token.is_some(), "Probed GitHub MCP prerequisites");

        let availability = match (&token, &runtime) {
            (None, _) => Availability::unavailable(format!("{ACCESS_TOKEN_ENV_VAR} is not set")),
            (Some(_), None) => Availability::unavailable(format!(
                "{ACCESS_TOKEN_ENV_VAR} is set but no container runtime ({}) was found",
                CONTAINER_RUNTIMES.join(", ")
            )),
            (Some(_), Some(runtime)) => {
                Availability::available(format!("{ACCESS_TOKEN_ENV_VAR} is set and {runtime} is available"))
            }
        };

        *self.resolved.write().unwrap_or_else(PoisonError::into_inner) = Resolved {
            runtime,
            token,
            read_only: options.read_only,
        };
        self.probe.set(availability);
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl ToolsProvider for GithubToolsProvider {
    fn mcp_settings(&self) -> Option<McpSettings> {
        let resolved = self.resolved.read().unwrap_or_else(PoisonError::into_inner);
        let runtime = resolved.runtime.as_ref()?;
        let token = resolved.token.as_ref()?;

        let mut args = vec![
            "run",
            "-i",
            "--rm",
            "-e",
            ACCESS_TOKEN_ENV_VAR,
            "--entrypoint",
            SERVER_ENTRYPOINT,
            SERVER_IMAGE,
            "stdio",
        ];
        if resolved.read_only {
            args.push("--read-only");
        }
        Some(McpSettings::stdio(runtime.as_str(), args).with_env(ACCESS_TOKEN_ENV_VAR, token.as_str()))
    }
}
