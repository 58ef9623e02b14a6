use aicli_domain::{McpSettings, McpSettingsError, McpTransportKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `[mcp]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMcpConfig {
    /// User-declared MCP servers, keyed by provider name
    pub servers: BTreeMap<String, FileMcpServerConfig>,
}

/// One `[mcp.servers.<name>]` entry
///
/// ```toml
/// [mcp.servers.kubernetes]
/// type = "stdio"
/// command = "npx"
/// args = ["-y", "kubernetes-mcp-server@latest"]
///
/// [mcp.servers.docs]
/// type = "http"
/// url = "https://docs.example.com/mcp"
/// headers = { Authorization = "Bearer ..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMcpServerConfig {
    /// `stdio`, `sse` or `http`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for FileMcpServerConfig {
    fn default() -> Self {
        Self {
            kind: McpTransportKind::Stdio.as_str().to_string(),
            command: None,
            args: Vec::new(),
            env: BTreeMap::new(),
            url: None,
            headers: BTreeMap::new(),
            description: None,
        }
    }
}

impl FileMcpServerConfig {
    /// Convert to validated connection settings
    pub fn to_settings(&self) -> Result<McpSettings, McpSettingsError> {
        let kind: McpTransportKind = self.kind.parse()?;
        let mut settings = match kind {
            McpTransportKind::Stdio => McpSettings::stdio(
                self.command.clone().unwrap_or_default(),
                self.args.iter().cloned(),
            ),
            McpTransportKind::Sse => McpSettings::sse(self.url.clone().unwrap_or_default()),
            McpTransportKind::StreamableHttp => {
                McpSettings::streamable_http(self.url.clone().unwrap_or_default())
            }
        };
        settings.env = self.env.clone();
        settings.headers = self.headers.clone();
        settings.validate()?;
        Ok(settings)
    }
}
