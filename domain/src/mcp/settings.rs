//! Remote tool (MCP) connection settings

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpSettingsError {
    #[error("invalid MCP transport type: {0}")]
    UnknownTransport(String),

    #[error("MCP stdio transport requires a command")]
    MissingCommand,

    #[error("MCP {0} transport requires a url")]
    MissingUrl(McpTransportKind),
}

/// Wire transport used to reach an MCP server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpTransportKind {
    /// Child process speaking over its standard streams
    Stdio,
    /// Server-Sent Events stream plus POST endpoint
    Sse,
    /// Streamable HTTP (single endpoint, JSON or SSE replies)
    StreamableHttp,
}

impl McpTransportKind {
    pub fn as_str(&self) -> &str {
        match self {
            McpTransportKind::Stdio => "stdio",
            McpTransportKind::Sse => "sse",
            McpTransportKind::StreamableHttp => "http",
        }
    }
}

impl std::fmt::Display for McpTransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for McpTransportKind {
    type Err = McpSettingsError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(McpTransportKind::Stdio),
            "sse" => Ok(McpTransportKind::Sse),
            "http" | "streamable-http" | "streamable_http" | "streamablehttp" => {
                Ok(McpTransportKind::StreamableHttp)
            }
            other => Err(McpSettingsError::UnknownTransport(other.to_string())),
        }
    }
}

impl Serialize for McpTransportKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for McpTransportKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// How to reach a provider's MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpSettings {
    #[serde(rename = "type")]
    pub kind: McpTransportKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl McpSettings {
    fn empty(kind: McpTransportKind) -> Self {
        Self {
            kind,
            command: None,
            args: Vec::new(),
            env: BTreeMap::new(),
            url: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn stdio<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: Some(command.into()),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::empty(McpTransportKind::Stdio)
        }
    }

    pub fn sse(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::empty(McpTransportKind::Sse)
        }
    }

    pub fn streamable_http(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::empty(McpTransportKind::StreamableHttp)
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), McpSettingsError> {
        match self.kind {
            McpTransportKind::Stdio if self.command.as_deref().is_none_or(str::is_empty) => {
                Err(McpSettingsError::MissingCommand)
            }
            McpTransportKind::Sse | McpTransportKind::StreamableHttp
                if self.url.as_deref().is_none_or(str::is_empty) =>
            {
                Err(McpSettingsError::MissingUrl(self.kind))
            }
            _ => Ok(()),
        }
    }
}
