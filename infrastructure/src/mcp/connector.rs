//! [`McpConnector`] over the stdio, SSE and streamable HTTP transports.

use super::http::StreamableHttpTransport;
use super::session::McpSession;
use super::sse::SseTransport;
use super::stdio::StdioTransport;
use super::transport::McpTransport;
use aicli_application::{McpClientSession, McpConnector, McpError};
use aicli_domain::{McpSettings, McpTransportKind};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default upper bound for a single MCP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct TransportConnector {
    request_timeout: Duration,
}

impl Default for TransportConnector {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl TransportConnector {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    async fn open_transport(
        &self,
        settings: &McpSettings,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn McpTransport>, McpError> {
        settings
            .validate()
            .map_err(|e| McpError::ConnectFailed(e.to_string()))?;
        let url = settings.url.as_deref().unwrap_or_default();

        Ok(match settings.kind {
            McpTransportKind::Stdio => Box::new(StdioTransport::spawn(settings, cancel)?),
            McpTransportKind::Sse => {
                let client = http_client(&settings.headers)?;
                Box::new(SseTransport::connect(client, url, cancel).await?)
            }
            McpTransportKind::StreamableHttp => {
                let client = http_client(&settings.headers)?;
                Box::new(StreamableHttpTransport::new(client, url, cancel)?)
            }
        })
    }
}

/// An HTTP client that sends the configured headers on every request.
pub fn http_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, McpError> {
    let mut defaults = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| McpError::ConnectFailed(format!("invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| McpError::ConnectFailed(format!("invalid value for header '{name}': {e}")))?;
        defaults.insert(name, value);
    }
    reqwest::Client::builder()
        .default_headers(defaults)
        .build()
        .map_err(|e| McpError::ConnectFailed(e.to_string()))
}

#[async_trait]
impl McpConnector for TransportConnector {
    async fn connect(
        &self,
        provider: &str,
        settings: &McpSettings,
        cancel: CancellationToken,
    ) -> Result<Arc<dyn McpClientSession>, McpError> {
        debug!(provider, transport = %settings.kind, "Connecting MCP server");
        let transport = self.open_transport(settings, &cancel).await?;
        let session = McpSession::initialize(provider, transport, self.request_timeout).await?;
        Ok(Arc::new(session))
    }
}
