//! MCP client manager
//!
//! Opens one session per tools provider that exposes MCP settings and
//! lists their remote tools. A provider that fails to connect or list is
//! logged and contributes no tools; its neighbours are unaffected.

use super::tool::adapt_remote_tool;
use crate::ports::feature_provider::{Feature, ToolsProvider};
use crate::ports::mcp_client::{McpClientSession, McpConnector, McpError};
use aicli_domain::Tool;
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A connected MCP session and the provider it belongs to
#[derive(Clone)]
pub struct McpClient {
    pub provider: String,
    pub session: Arc<dyn McpClientSession>,
}

/// Remote tools gathered from every session
#[derive(Default)]
pub struct ToolsListing {
    pub tools: Vec<Tool>,
    /// Providers whose listing failed
    pub failures: Vec<(String, McpError)>,
}

pub struct McpClientManager {
    clients: Vec<McpClient>,
}

impl McpClientManager {
    /// Connect every provider that exposes MCP settings.
    ///
    /// Sessions are closed when `cancel` fires.
    pub async fn start(
        connector: &dyn McpConnector,
        providers: &[Arc<dyn ToolsProvider>],
        cancel: &CancellationToken,
    ) -> Self {
        let pending = providers.iter().filter_map(|provider| {
            let settings = provider.mcp_settings()?;
            let name = provider.name().to_string();
            let cancel = cancel.child_token();
            Some(async move {
                if let Err(e) = settings.validate() {
                    warn!(provider = %name, error = %e, "Invalid MCP settings, skipping provider");
                    return None;
                }
                match connector.connect(&name, &settings, cancel).await {
                    Ok(session) => {
                        info!(provider = %name, transport = %settings.kind.as_str(), "MCP session connected");
                        Some(McpClient {
                            provider: name,
                            session,
                        })
                    }
                    Err(e) => {
                        warn!(provider = %name, error = %e, "Failed to connect MCP server, skipping provider");
                        None
                    }
                }
            })
        });

        let clients: Vec<McpClient> = join_all(pending).await.into_iter().flatten().collect();

        let watched = clients.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            debug!("Cancellation requested, closing MCP sessions");
            close_all(&watched).await;
        });

        Self { clients }
    }

    pub fn clients(&self) -> &[McpClient] {
        &self.clients
    }

    /// List and adapt the remote tools of every session
    pub async fn tools(&self) -> ToolsListing {
        let listings = join_all(self.clients.iter().map(|client| async move {
            (client, client.session.list_tools().await)
        }))
        .await;

        let mut listing = ToolsListing::default();
        for (client, result) in listings {
            match result {
                Ok(remote_tools) => {
                    debug!(provider = %client.provider, count = remote_tools.len(), "Listed MCP tools");
                    listing.tools.extend(
                        remote_tools
                            .iter()
                            .map(|remote| adapt_remote_tool(&client.provider, remote, client.session.clone())),
                    );
                }
                Err(e) => {
                    warn!(provider = %client.provider, error = %e, "Failed to list MCP tools");
                    listing.failures.push((client.provider.clone(), e));
                }
            }
        }
        listing
    }

    /// Close every session. Close errors are ignored; calling this twice is harmless.
    pub async fn stop_all(&self) {
        close_all(&self.clients).await;
    }
}

async fn close_all(clients: &[McpClient]) {
    for client in clients {
        if let Err(e) = client.session.close().await {
            debug!(provider = %client.provider, error = %e, "Ignoring MCP close error");
        }
    }
}
