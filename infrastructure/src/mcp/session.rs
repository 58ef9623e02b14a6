//! MCP protocol session on top of any [`McpTransport`].

use super::protocol::{
    JsonRpcNotification, JsonRpcRequest, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_PING,
    METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, PROTOCOL_VERSION, initialize_params, negotiated_version,
    parse_tools_page, tools_call_params, tools_list_params,
};
use super::transport::McpTransport;
use aicli_application::{McpClientSession, McpError, RemoteTool};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on `tools/list` pages, against servers that never stop paginating.
const MAX_LIST_PAGES: usize = 100;

pub struct McpSession {
    provider: String,
    transport: Box<dyn McpTransport>,
    request_timeout: Duration,
    closed: AtomicBool,
}

impl McpSession {
    /// Run the `initialize` handshake over `transport`.
    pub async fn initialize(
        provider: impl Into<String>,
        transport: Box<dyn McpTransport>,
        request_timeout: Duration,
    ) -> Result<Self, McpError> {
        let session = Self {
            provider: provider.into(),
            transport,
            request_timeout,
            closed: AtomicBool::new(false),
        };

        let result = session
            .call(METHOD_INITIALIZE, Some(initialize_params()))
            .await
            .map_err(|e| match e {
                McpError::ConnectionClosed | McpError::Timeout(_) => e,
                other => McpError::ConnectFailed(format!("initialize failed: {other}")),
            })?;
        let version = negotiated_version(&result).unwrap_or(PROTOCOL_VERSION);
        session.transport.set_protocol_version(version);
        session
            .transport
            .notify(JsonRpcNotification::new(METHOD_INITIALIZED, None))
            .await?;

        info!(provider = %session.provider, protocol_version = %version, "MCP session initialized");
        Ok(session)
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        if self.is_closed() {
            return Err(McpError::ConnectionClosed);
        }
        let request = JsonRpcRequest::new(method, params);
        debug!(provider = %self.provider, id = request.id, method, "MCP request");

        let response = tokio::time::timeout(self.request_timeout, self.transport.request(request))
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))?;

        match response {
            Ok(response) => response.into_result(),
            // A transport torn down by close() reports as closed
            Err(_) if self.is_closed() => Err(McpError::ConnectionClosed),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl McpClientSession for McpSession {
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, McpError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let result = self
                .call(METHOD_TOOLS_LIST, tools_list_params(cursor.as_deref()))
                .await?;
            let page = parse_tools_page(result)?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(tools),
            }
        }
        Err(McpError::Protocol(format!(
            "tools/list did not finish after {MAX_LIST_PAGES} pages"
        )))
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        self.call(METHOD_TOOLS_CALL, Some(tools_call_params(name, arguments)))
            .await
    }

    async fn ping(&self) -> Result<(), McpError> {
        self.call(METHOD_PING, None).await.map(|_| ())
    }

    async fn close(&self) -> Result<(), McpError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(provider = %self.provider, "Closing MCP session");
        self.transport.close().await;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcResponse, parse_response};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    /// Answers each method from a script and records the traffic.
    #[derive(Default)]
    struct ScriptedTransport {
        methods: Mutex<Vec<String>>,
        version: Mutex<Option<String>>,
        closes: AtomicUsize,
        hang: bool,
    }

    fn reply(id: u64, result: Value) -> JsonRpcResponse {
        parse_response(&json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string())
            .unwrap()
            .unwrap()
    }

    #[async_trait]
    impl McpTransport for Arc<ScriptedTransport> {
        async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.methods.lock().unwrap().push(request.method.clone());
            let result = match request.method.as_str() {
                METHOD_INITIALIZE => json!({"protocolVersion": "2024-11-05", "capabilities": {}}),
                METHOD_TOOLS_LIST => match request.params.as_ref().and_then(|p| p.get("cursor")) {
                    None => json!({"tools": [{"name": "first"}], "nextCursor": "2"}),
                    Some(_) => json!({"tools": [{"name": "second"}]}),
                },
                METHOD_TOOLS_CALL => {
                    let params = request.params.unwrap_or_default();
                    json!({"content": [{"type": "text", "text": format!("{} {}", params["name"], params["arguments"])}]})
                }
                _ => json!({}),
            };
            Ok(reply(request.id, result))
        }

        async fn notify(&self, notification: JsonRpcNotification) -> Result<(), McpError> {
            self.methods.lock().unwrap().push(notification.method);
            Ok(())
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }

        fn set_protocol_version(&self, version: &str) {
            *self.version.lock().unwrap() = Some(version.to_string());
        }
    }

    async fn session() -> (McpSession, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::default());
        let session = McpSession::initialize(
            "test",
            Box::new(Arc::clone(&transport)),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        (session, transport)
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let (_session, transport) = session().await;

        assert_eq!(
            *transport.methods.lock().unwrap(),
            vec!["initialize", "notifications/initialized"]
        );
        assert_eq!(transport.version.lock().unwrap().as_deref(), Some("2024-11-05"));
    }

    #[tokio::test]
    async fn test_list_tools_follows_cursor() {
        let (session, _) = session().await;

        let tools = session.list_tools().await.unwrap();

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_call_tool_sends_name_and_arguments() {
        let (session, _) = session().await;

        let result = session
            .call_tool("search", json!({"query": "rust"}))
            .await
            .unwrap();

        assert_eq!(result["content"][0]["text"], r#""search" {"query":"rust"}"#);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (session, transport) = session().await;
        session.ping().await.unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();

        assert_eq!(transport.closes.load(Ordering::SeqCst), 1);
        assert!(session.is_closed());
    }

    #[tokio::test]
    async fn test_calls_after_close_fail_fast() {
        let (session, _) = session().await;
        session.close().await.unwrap();

        let err = session.call_tool("search", json!({})).await.unwrap_err();
        assert_eq!(err, McpError::ConnectionClosed);
        assert!(err.to_string().contains("closed"));
        assert!(session.list_tools().await.unwrap_err().is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout() {
        let transport = Arc::new(ScriptedTransport {
            hang: true,
            ..Default::default()
        });
        let err = McpSession::initialize("slow", Box::new(transport), Duration::from_secs(60))
            .await
            .err()
            .unwrap();

        assert_eq!(err, McpError::Timeout(Duration::from_secs(60)));
    }
}
