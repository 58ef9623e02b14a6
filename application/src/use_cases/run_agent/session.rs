//! Lock-guarded conversation session shared between the agent task and readers

use aicli_domain::{Message, Session, ToolCallRequest};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Shared handle to a [`Session`].
///
/// The agent task is the only writer. Readers get copies; the lock is held
/// only while copying or appending, never across model or tool calls.
/// Every mutation bumps a revision readers can [`subscribe`](Self::subscribe) to.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(session)),
            revision: Arc::new(revision),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let result = {
            let mut session = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut session)
        };
        self.revision.send_modify(|revision| *revision += 1);
        result
    }

    pub fn snapshot(&self) -> Session {
        self.read(Session::clone)
    }

    /// Committed history plus the partial message while streaming
    pub fn messages(&self) -> Vec<Message> {
        self.read(Session::messages)
    }

    pub fn is_running(&self) -> bool {
        self.read(Session::is_running)
    }

    pub fn model_input(&self) -> Vec<Message> {
        self.read(Session::model_input)
    }

    /// Append the user message and mark the session running, atomically
    pub fn begin_round(&self, message: Message) {
        self.update(|session| {
            session.push(message);
            session.set_running(true);
        });
    }

    pub fn append_partial(&self, chunk: &str) {
        self.update(|session| session.append_partial(chunk));
    }

    pub fn commit_tool_calls(&self, calls: Vec<ToolCallRequest>) {
        self.update(|session| session.commit_tool_calls(calls));
    }

    pub fn push(&self, message: Message) {
        self.update(|session| session.push(message));
    }

    /// Commit the streamed text and return to idle
    pub fn finish_round(&self) {
        self.update(|session| {
            session.commit_partial();
            session.set_running(false);
        });
    }

    /// Keep any streamed text, append an error message and return to idle
    pub fn fail_round(&self, error: impl Into<String>) {
        let error = error.into();
        self.update(|session| {
            session.commit_partial();
            session.push(Message::error(error));
            session.set_running(false);
        });
    }

    pub fn reset(&self) {
        self.update(Session::reset);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl std::fmt::Debug for SharedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedSession").field(&self.snapshot()).finish()
    }
}
