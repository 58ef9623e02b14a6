//! Model Context Protocol client.
//!
//! ```text
//! TransportConnector::connect(settings)
//!     ├─ stdio ─────────▶ StdioTransport           (child process pipes)
//!     ├─ sse ───────────▶ SseTransport             (GET stream + POST endpoint)
//!     └─ http ──────────▶ StreamableHttpTransport  (POST, JSON or SSE reply)
//!                              │
//!                              ▼
//!                    McpSession::initialize  ── implements McpClientSession
//! ```

pub mod connector;
pub mod http;
pub mod protocol;
pub mod session;
pub mod sse;
pub mod stdio;
pub mod transport;

pub use connector::{DEFAULT_REQUEST_TIMEOUT, TransportConnector};
pub use session::McpSession;
pub use transport::McpTransport;
