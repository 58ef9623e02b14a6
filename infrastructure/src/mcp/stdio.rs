//! Stdio binding: newline-delimited JSON-RPC over a child process's pipes.
//!
//! A background reader task owns the child's stdout and routes each
//! response to the request waiting for it. The child is bound to a
//! [`CancellationToken`]: cancelling it (or closing the transport) kills
//! the process. On Linux the child also receives `SIGTERM` when this
//! process dies.

use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, parse_response};
use super::transport::{McpTransport, PendingRequests, await_response};
use aicli_application::McpError;
use aicli_domain::McpSettings;
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

pub struct StdioTransport {
    writer: Mutex<BufWriter<ChildStdin>>,
    pending: Arc<PendingRequests>,
    /// Cancelled on close, on parent cancellation, or when stdout ends
    shutdown: CancellationToken,
    _reader_handle: JoinHandle<()>,
}

impl StdioTransport {
    /// Spawn the server process described by `settings`.
    pub fn spawn(settings: &McpSettings, cancel: &CancellationToken) -> Result<Self, McpError> {
        let program = settings
            .command
            .as_deref()
            .filter(|command| !command.is_empty())
            .ok_or_else(|| McpError::ConnectFailed("stdio transport requires a command".into()))?;
        debug!(command = %program, args = ?settings.args, "Spawning MCP server");

        let mut cmd = Command::new(program);
        cmd.args(&settings.args)
            .envs(&settings.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Ensure the child receives SIGTERM when this process dies
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::ConnectFailed(format!("failed to spawn '{program}': {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::ConnectFailed("failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::ConnectFailed("failed to capture stdout".into()))?;
        if let Some(stderr) = child.stderr.take() {
            let program = program.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(server = %program, "stderr: {line}");
                }
            });
        }

        let shutdown = cancel.child_token();
        let pending = Arc::new(PendingRequests::new());

        tokio::spawn(Self::supervise(child, shutdown.clone()));
        let reader_handle = tokio::spawn(Self::reader_loop(
            stdout,
            Arc::clone(&pending),
            shutdown.clone(),
        ));

        Ok(Self {
            writer: Mutex::new(BufWriter::new(stdin)),
            pending,
            shutdown,
            _reader_handle: reader_handle,
        })
    }

    /// Kill the child once the transport shuts down.
    async fn supervise(mut child: Child, shutdown: CancellationToken) {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Killing MCP server process");
                if let Err(e) = child.kill().await {
                    debug!(error = %e, "Failed to kill MCP server process");
                }
            }
            status = child.wait() => {
                debug!(?status, "MCP server process exited");
                shutdown.cancel();
            }
        }
    }

    /// Single owner of the child's stdout.
    async fn reader_loop(
        stdout: ChildStdout,
        pending: Arc<PendingRequests>,
        shutdown: CancellationToken,
    ) {
        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => break,
                line = lines.next_line() => line,
            };
            match line {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match parse_response(line) {
                        Ok(Some(response)) => pending.complete(response).await,
                        Ok(None) => trace!("Ignoring server message: {line}"),
                        Err(e) => warn!(error = %e, "Unparseable message from MCP server"),
                    }
                }
                Ok(None) => {
                    debug!("MCP server closed stdout");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read from MCP server");
                    break;
                }
            }
        }

        shutdown.cancel();
        pending.clear().await;
    }

    async fn write_frame<T: Serialize>(&self, frame: &T) -> Result<(), McpError> {
        if self.shutdown.is_cancelled() {
            return Err(McpError::ConnectionClosed);
        }
        let mut json = serde_json::to_string(frame)
            .map_err(|e| McpError::Protocol(format!("failed to encode message: {e}")))?;
        json.push('\n');

        let mut writer = self.writer.lock().await;
        let written = async {
            writer.write_all(json.as_bytes()).await?;
            writer.flush().await
        }
        .await;
        written.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe => McpError::ConnectionClosed,
            _ => McpError::Transport(e.to_string()),
        })
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse, McpError> {
        let id = request.id;
        let rx = self.pending.register(id).await;

        if let Err(e) = self.write_frame(&request).await {
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
        self.write_frame(&notification).await
    }

    async fn close(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::METHOD_PING;
    use std::time::Duration;

    /// Replies `{"result":{}}` to every request, echoing its id.
    fn echo_server() -> McpSettings {
        McpSettings::stdio(
            "sh",
            [
                "-c",
                r#"while IFS= read -r line; do id=${line#*\"id\":}; id=${id%%,*}; printf '{"jsonrpc":"2.0","id":%s,"result":{}}\n' "$id"; done"#,
            ],
        )
    }

    #[tokio::test]
    async fn test_request_round_trip() {
        let transport = StdioTransport::spawn(&echo_server(), &CancellationToken::new()).unwrap();

        let request = JsonRpcRequest::new(METHOD_PING, None);
        let id = request.id;
        let response = tokio::time::timeout(Duration::from_secs(5), transport.request(request))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.id, Some(id));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_spawn_missing_command_fails() {
        let settings = McpSettings::stdio("definitely-not-a-real-mcp-server", Vec::<String>::new());
        let err = StdioTransport::spawn(&settings, &CancellationToken::new())
            .err()
            .unwrap();
        assert!(matches!(err, McpError::ConnectFailed(_)));
    }

    #[tokio::test]
    async fn test_cancellation_closes_transport() {
        let cancel = CancellationToken::new();
        let transport = StdioTransport::spawn(&echo_server(), &cancel).unwrap();

        cancel.cancel();

        let err = transport
            .request(JsonRpcRequest::new(METHOD_PING, None))
            .await
            .unwrap_err();
        assert_eq!(err, McpError::ConnectionClosed);
    }

    #[tokio::test]
    async fn test_exited_server_reports_closed() {
        let settings = McpSettings::stdio("true", Vec::<String>::new());
        let transport = StdioTransport::spawn(&settings, &CancellationToken::new()).unwrap();

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            transport.request(JsonRpcRequest::new(METHOD_PING, None)),
        )
        .await
        .unwrap()
        .unwrap_err();
        assert_eq!(err, McpError::ConnectionClosed);
    }
}
