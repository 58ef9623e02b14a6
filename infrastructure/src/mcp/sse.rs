//! Server-Sent Events parsing and the legacy SSE binding.
//!
//! The SSE binding opens a long-lived `GET` event stream. Its first
//! `endpoint` event names the URL that client messages are `POST`ed to;
//! responses come back on the stream as `message` events.

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, parse_response};
use super::transport::{McpTransport, PendingRequests, await_response};
use aicli_application::McpError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// How long to wait for the `endpoint` event after connecting.
const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(30);

/// Splits a byte stream into lines, keeping blank lines (event boundaries).
#[derive(Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            let line_end = if end > start && self.buffer[end - 1] == b'\r' {
                end - 1
            } else {
                end
            };
            lines.push(String::from_utf8_lossy(&self.buffer[start..line_end]).into_owned());
            start = end + 1;
        }
        self.buffer.drain(..start);
        lines
    }

    /// Remaining unterminated text, followed by a boundary.
    pub fn finish(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.buffer.is_empty() {
            lines.push(String::from_utf8_lossy(&self.buffer).into_owned());
            self.buffer.clear();
        }
        lines.push(String::new());
        lines
    }
}

/// A dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Accumulates `event:` and `data:` fields until a blank line.
#[derive(Default)]
pub struct SseEventParser {
    event: Option<String>,
    data: Vec<String>,
}

impl SseEventParser {
    pub fn feed(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

pub fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case(EVENT_STREAM_CONTENT_TYPE))
}

/// Parse every event of a response body, calling `on_event` until it returns `true`.
pub async fn read_events(
    response: reqwest::Response,
    mut on_event: impl FnMut(SseEvent) -> bool,
) -> Result<(), McpError> {
    let mut stream = response.bytes_stream();
    let mut lines = SseLineBuffer::default();
    let mut parser = SseEventParser::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| McpError::Transport(e.to_string()))?;
        for line in lines.push(&chunk) {
            if let Some(event) = parser.feed(&line)
                && on_event(event)
            {
                return Ok(());
            }
        }
    }
    for line in lines.finish() {
        if let Some(event) = parser.feed(&line)
            && on_event(event)
        {
            return Ok(());
        }
    }
    Ok(())
}

pub struct SseTransport {
    client: reqwest::Client,
    endpoint: Url,
    pending: Arc<PendingRequests>,
    shutdown: CancellationToken,
    _reader_handle: JoinHandle<()>,
}

impl SseTransport {
    /// Open the event stream and wait for the `endpoint` event.
    pub async fn connect(
        client: reqwest::Client,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Self, McpError> {
        let base = Url::parse(url).map_err(|e| McpError::ConnectFailed(format!("invalid url '{url}': {e}")))?;
        let response = client
            .get(base.clone())
            .header(reqwest::header::ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| McpError::ConnectFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::ConnectFailed(format!("HTTP error: {}", response.status())));
        }

        let shutdown = cancel.child_token();
        let pending = Arc::new(PendingRequests::new());
        let (endpoint_tx, endpoint_rx) = oneshot::channel();
        let reader_handle = tokio::spawn(Self::reader_loop(
            response,
            Arc::clone(&pending),
            shutdown.clone(),
            endpoint_tx,
        ));

        let endpoint = tokio::time::timeout(ENDPOINT_TIMEOUT, endpoint_rx)
            .await
            .map_err(|_| McpError::ConnectFailed("no endpoint event received".into()))?
            .map_err(|_| McpError::ConnectFailed("event stream ended before endpoint event".into()))?;
        let endpoint = base
            .join(&endpoint)
            .map_err(|e| McpError::ConnectFailed(format!("invalid endpoint '{endpoint}': {e}")))?;
        debug!(%endpoint, "SSE endpoint received");

        Ok(Self {
            client,
            endpoint,
            pending,
            shutdown,
            _reader_handle: reader_handle,
        })
    }

    async fn reader_loop(
        response: reqwest::Response,
        pending: Arc<PendingRequests>,
        shutdown: CancellationToken,
        endpoint_tx: oneshot::Sender<String>,
    ) {
        let mut endpoint_tx = Some(endpoint_tx);
        let mut stream = response.bytes_stream();
        let mut lines = SseLineBuffer::default();
        let mut parser = SseEventParser::default();

        loop {
            let chunk = tokio::select! {
                _ = shutdown.cancelled() => break,
                chunk = stream.next() => chunk,
            };
            let received = match chunk {
                Some(Ok(chunk)) => lines.push(&chunk),
                Some(Err(e)) => {
                    warn!(error = %e, "SSE stream failed");
                    break;
                }
                None => {
                    debug!("SSE stream ended");
                    break;
                }
            };
            for line in received {
                let Some(event) = parser.feed(&line) else {
                    continue;
                };
                match event.event.as_str() {
                    "endpoint" => {
                        if let Some(tx) = endpoint_tx.take() {
                            let _ = tx.send(event.data);
                        }
                    }
                    "message" => match parse_response(&event.data) {
                        Ok(Some(response)) => pending.complete(response).await,
                        Ok(None) => trace!("Ignoring server message: {}", event.data),
                        Err(e) => warn!(error = %e, "Unparseable message from MCP server"),
                    },
                    other => trace!(event = %other, "Ignoring SSE event"),
                }
            }
        }

        shutdown.cancel();
        pending.clear().await;
    }

    async fn post<T: Serialize>(&self, frame: &T) -> Result<(), McpError> {
        if self.shutdown.is_cancelled() {
            return Err(McpError::ConnectionClosed);
        }
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(frame)
            .send()
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(McpError::Transport(format!("HTTP error: {}", response.status())));
        }
        Ok(())
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        let id = request.id;
        let rx = self.pending.register(id).await;

        if let Err(e) = self.post(&request).await {
            self.pending.remove(id).await;
            return Err(e);
        }

        tokio::select! {
            response = await_response(rx) => response,
            _ = self.shutdown.cancelled() => {
                self.pending.remove(id).await;
                Err(McpError::ConnectionClosed)
            }
        }
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError> {
        self.post(&notification).await
    }

    async fn close(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Vec<SseEvent> {
        let mut lines = SseLineBuffer::default();
        let mut parser = SseEventParser::default();
        lines
            .push(input.as_bytes())
            .into_iter()
            .chain(lines.finish())
            .filter_map(|line| parser.feed(&line))
            .collect()
    }

    #[test]
    fn test_line_buffer_handles_partial_lines() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: one").is_empty());
        assert_eq!(buffer.push(b"\r\n\n"), vec!["data: one", ""]);
        assert_eq!(buffer.finish(), vec![""]);
    }

    #[test]
    fn test_endpoint_and_message_events() {
        let events = parse_all(
            "event: endpoint\ndata: /messages?session=1\n\n: keep-alive\n\nevent: message\ndata: {\"id\":1}\n\n",
        );

        assert_eq!(
            events,
            vec![
                SseEvent {
                    event: "endpoint".into(),
                    data: "/messages?session=1".into()
                },
                SseEvent {
                    event: "message".into(),
                    data: "{\"id\":1}".into()
                },
            ]
        );
    }

    #[test]
    fn test_multiline_data_and_default_event() {
        let events = parse_all("data: {\"a\":\ndata: 1}");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "{\"a\":\n1}");
    }

    #[test]
    fn test_detects_event_stream_content_type() {
        assert!(is_event_stream_content_type("text/event-stream; charset=utf-8"));
        assert!(!is_event_stream_content_type("application/json"));
    }

    #[test]
    fn test_endpoint_resolves_against_base() {
        let base = Url::parse("http://localhost:8080/sse").unwrap();
        assert_eq!(
            base.join("/messages?sessionId=abc").unwrap().as_str(),
            "http://localhost:8080/messages?sessionId=abc"
        );
        assert_eq!(
            base.join("http://other:9000/post").unwrap().as_str(),
            "http://other:9000/post"
        );
    }
}
