//! Conversation session domain.
//!
//! - [`entities::Session`]: history, running flag and in-progress message
//! - [`message::Message`]: a single message within a session
//! - [`stream::StreamEvent`]: events of a streamed model step

pub mod entities;
pub mod message;
pub mod stream;

pub use entities::Session;
pub use message::{Message, Role};
pub use stream::{StreamEvent, ToolCallRequest};
