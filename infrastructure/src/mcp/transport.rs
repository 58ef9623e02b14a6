//! Transport abstraction shared by the stdio, SSE and streamable HTTP bindings.
//!
//! A transport moves JSON-RPC frames; it knows nothing about MCP methods.
//! Transports whose replies arrive on a separate channel (stdio, SSE)
//! correlate them through [`PendingRequests`].

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use aicli_application::McpError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{RwLock, oneshot};
use tracing::debug;

#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a request and wait for the matching response.
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError>;

    /// Send a notification (fire-and-forget).
    async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError>;

    /// Release the underlying connection or child process.
    async fn close(&self);

    /// Record the version agreed during `initialize`.
    fn set_protocol_version(&self, _version: &str) {}
}

/// Outstanding requests waiting for a response, keyed by request id.
#[derive(Default)]
pub struct PendingRequests {
    inner: RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, id: u64) -> oneshot::Receiver<JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        self.inner.write().await.insert(id, tx);
        rx
    }

    pub async fn remove(&self, id: u64) {
        self.inner.write().await.remove(&id);
    }

    /// Hand a response to its waiting request.
    pub async fn complete(&self, response: JsonRpcResponse) {
        let Some(id) = response.id else {
            debug!("Dropping response without id");
            return;
        };
        let sender = self.inner.write().await.remove(&id);
        match sender {
            Some(tx) => {
                let _ = tx.send(response);
            }
            None => debug!(id, "No pending request for response"),
        }
    }

    /// Drop every waiter; their receivers observe a closed channel.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

/// Wait for a registered response. A dropped sender means the reader stopped.
pub async fn await_response(
    rx: oneshot::Receiver<JsonRpcResponse>,
) -> Result<JsonRpcResponse, McpError> {
    rx.await.map_err(|_| McpError::ConnectionClosed)
}
