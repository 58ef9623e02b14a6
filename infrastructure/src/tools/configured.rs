//! Tools providers declared in the `[mcp.servers]` configuration section.

use aicli_application::{Feature, ProviderOptions, ToolsProvider};
use aicli_domain::{Availability, FeatureAttributes, McpSettings, McpTransportKind, ProbeState};
use async_trait::async_trait;

pub struct ConfiguredMcpProvider {
    attributes: FeatureAttributes,
    settings: McpSettings,
    probe: ProbeState,
}

impl ConfiguredMcpProvider {
    pub fn new(name: impl Into<String>, description: Option<String>, settings: McpSettings) -> Self {
        let name = name.into();
        let description = description.unwrap_or_else(|| format!("User-configured MCP server '{name}'"));
        let local = settings.kind == McpTransportKind::Stdio;
        Self {
            attributes: FeatureAttributes::new(name, description).with_local(local),
            settings,
            probe: ProbeState::new(),
        }
    }

    fn probe_settings(&self) -> Availability {
        if let Err(e) = self.settings.validate() {
            return Availability::unavailable(e.to_string());
        }
        match self.settings.kind {
            McpTransportKind::Stdio => {
                let command = self.settings.command.as_deref().unwrap_or_default();
                match which::which(command) {
                    Ok(path) => Availability::available(format!("{} is available", path.display())),
                    Err(_) => Availability::unavailable(format!("{command} was not found")),
                }
            }
            McpTransportKind::Sse | McpTransportKind::StreamableHttp => Availability::available(
                format!(
                    "{} server configured at {}",
                    self.settings.kind,
                    self.settings.url.as_deref().unwrap_or_default()
                ),
            ),
        }
    }
}

#[async_trait]
impl Feature for ConfiguredMcpProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    async fn initialize(&self, _options: &ProviderOptions) {
        self.probe.set(self.probe_settings());
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl ToolsProvider for ConfiguredMcpProvider {
    fn mcp_settings(&self) -> Option<McpSettings> {
        Some(self.settings.clone())
    }
}
