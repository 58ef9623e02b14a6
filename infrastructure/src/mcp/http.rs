//! Streamable HTTP binding.
//!
//! Every client message is a `POST` to a single endpoint. Replies are
//! either a JSON body or an SSE stream carrying the response. The server
//! assigns an `mcp-session-id` on `initialize`; it is echoed on every
//! later request together with the negotiated `MCP-Protocol-Version`.

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, parse_response};
use super::sse::{EVENT_STREAM_CONTENT_TYPE, is_event_stream_content_type, read_events};
use super::transport::McpTransport;
use aicli_application::McpError;
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const MCP_JSON_CONTENT_TYPE: &str = "application/json";
pub const MCP_JSON_AND_SSE_ACCEPT: &str = "application/json, text/event-stream";
pub const MCP_PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";
pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

pub fn apply_post_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request
        .header(reqwest::header::CONTENT_TYPE, MCP_JSON_CONTENT_TYPE)
        .header(reqwest::header::ACCEPT, MCP_JSON_AND_SSE_ACCEPT)
}

pub fn apply_protocol_version_header(
    request: reqwest::RequestBuilder,
    protocol_version: Option<&str>,
) -> reqwest::RequestBuilder {
    match protocol_version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => request.header(MCP_PROTOCOL_VERSION_HEADER, version),
        None => request,
    }
}

pub struct StreamableHttpTransport {
    client: reqwest::Client,
    url: Url,
    session_id: RwLock<Option<String>>,
    protocol_version: RwLock<Option<String>>,
    shutdown: CancellationToken,
}

impl StreamableHttpTransport {
    pub fn new(client: reqwest::Client, url: &str, cancel: &CancellationToken) -> Result<Self, McpError> {
        let url = Url::parse(url).map_err(|e| McpError::ConnectFailed(format!("invalid url '{url}': {e}")))?;
        Ok(Self {
            client,
            url,
            session_id: RwLock::new(None),
            protocol_version: RwLock::new(None),
            shutdown: cancel.child_token(),
        })
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn protocol_version(&self) -> Option<String> {
        self.protocol_version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_session_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = apply_protocol_version_header(request, self.protocol_version().as_deref());
        match self.session_id() {
            Some(session_id) => request.header(MCP_SESSION_ID_HEADER, session_id),
            None => request,
        }
    }

    async fn post<T: Serialize>(&self, frame: &T) -> Result<reqwest::Response, McpError> {
        if self.shutdown.is_cancelled() {
            return Err(McpError::ConnectionClosed);
        }
        let body = serde_json::to_vec(frame)
            .map_err(|e| McpError::Protocol(format!("failed to encode message: {e}")))?;
        let request = self.with_session_headers(apply_post_headers(self.client.post(self.url.clone())));

        let response = tokio::select! {
            _ = self.shutdown.cancelled() => return Err(McpError::ConnectionClosed),
            response = request.body(body).send() => response,
        }
        .map_err(|e| McpError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(McpError::Transport(format!("HTTP error: {}", response.status())));
        }
        if let Some(session_id) = response
            .headers()
            .get(MCP_SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            *self.session_id.write().unwrap_or_else(PoisonError::into_inner) =
                Some(session_id.to_string());
        }
        Ok(response)
    }
}

/// Read an event-stream reply until the response with `id` arrives.
async fn response_from_event_stream(
    response: reqwest::Response,
    id: u64,
) -> Result<JsonRpcResponse, McpError> {
    let mut found = None;
    let mut failure = None;
    read_events(response, |event| {
        if event.event != "message" {
            return false;
        }
        match parse_response(&event.data) {
            Ok(Some(response)) if response.id == Some(id) => {
                found = Some(response);
                true
            }
            Ok(_) => false,
            Err(e) => {
                failure = Some(e);
                true
            }
        }
    })
    .await?;

    if let Some(e) = failure {
        return Err(e);
    }
    found.ok_or_else(|| McpError::Protocol("event stream ended without a response".into()))
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        debug!(url = %self.url, method = %request.method, "Sending MCP HTTP request");
        let response = self.post(&request).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        let reply = if is_event_stream_content_type(&content_type) {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Err(McpError::ConnectionClosed),
                reply = response_from_event_stream(response, request.id) => reply?,
            }
        } else {
            let body = response
                .text()
                .await
                .map_err(|e| McpError::Transport(e.to_string()))?;
            parse_response(&body)?
                .ok_or_else(|| McpError::Protocol(format!("expected a response, got: {body}")))?
        };
        Ok(reply)
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError> {
        self.post(&notification).await.map(|_| ())
    }

    async fn close(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.shutdown.cancel();

        // Servers may refuse session termination; that is not an error here
        if let Some(session_id) = self.session_id() {
            let request = self
                .client
                .delete(self.url.clone())
                .header(MCP_SESSION_ID_HEADER, session_id);
            if let Err(e) = apply_protocol_version_header(request, self.protocol_version().as_deref())
                .send()
                .await
            {
                warn!(error = %e, "Failed to terminate MCP HTTP session");
            }
        }
    }

    fn set_protocol_version(&self, version: &str) {
        *self
            .protocol_version
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(version.to_string());
    }
}
