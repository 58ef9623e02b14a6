//! Conversation agent use case
//!
//! One background task drains the input channel and runs each user message
//! as a round:
//!
//! ```text
//!   Idle ──user message──▶ Running ──stream exhausted──▶ Idle
//!                             │
//!                             └──build/model/tool failure──▶ error message ──▶ Idle
//! ```
//!
//! A failed round appends an error-role message and leaves the loop alive.

mod dynamic_model;
mod react;
mod session;
mod types;

pub use dynamic_model::DynamicToolModel;
pub use react::ReactAgent;
pub use session::SharedSession;
pub use types::AgentError;

use crate::config::ExecutionParams;
use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
use crate::ports::chat_model::ChatModel;
use crate::tools::ToolManager;
use aicli_domain::{Message, Session};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct ConversationAgent {
    model: Arc<dyn ChatModel>,
    tool_manager: Arc<ToolManager>,
    params: ExecutionParams,
    session: SharedSession,
    progress: Arc<dyn AgentProgressNotifier>,
    input_tx: mpsc::UnboundedSender<Message>,
    input_rx: Mutex<Option<mpsc::UnboundedReceiver<Message>>>,
}

impl ConversationAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tool_manager: Arc<ToolManager>,
        system_prompt: Option<String>,
        params: ExecutionParams,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Self {
            model,
            tool_manager,
            params,
            session: SharedSession::new(Session::new(system_prompt)),
            progress: Arc::new(NoAgentProgress),
            input_tx,
            input_rx: Mutex::new(Some(input_rx)),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn AgentProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    /// Sender for user messages. Sending never blocks.
    pub fn input(&self) -> mpsc::UnboundedSender<Message> {
        self.input_tx.clone()
    }

    /// Copy of the current session state
    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn shared_session(&self) -> &SharedSession {
        &self.session
    }

    /// Clear the conversation, keeping the system prompt
    pub fn reset(&self) {
        self.session.reset();
    }

    pub fn tool_manager(&self) -> &Arc<ToolManager> {
        &self.tool_manager
    }

    /// Spawn the loop that drains the input channel until `cancel` fires.
    ///
    /// The loop can only be started once; later calls return a task that
    /// exits immediately.
    pub fn run(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let receiver = self
            .input_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        tokio::spawn(async move {
            let Some(mut receiver) = receiver else {
                warn!("Conversation loop already started");
                return;
            };
            info!(model = %self.model.name(), "Conversation loop started");

            loop {
                let message = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    message = receiver.recv() => match message {
                        Some(message) => message,
                        None => break,
                    },
                };
                self.prompt(message, &cancel).await;
            }

            debug!("Conversation loop stopped");
        })
    }

    /// Run one round for `message`.
    pub async fn prompt(&self, message: Message, cancel: &CancellationToken) {
        self.session.begin_round(message);

        let outcome = match ReactAgent::build(
            self.model.clone(),
            self.tool_manager.clone(),
            self.params.clone(),
        ) {
            Ok(agent) => agent.run(&self.session, self.progress.as_ref(), cancel).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => self.session.finish_round(),
            Err(e) => {
                warn!(error = %e, "Conversation round failed");
                self.session.fail_round(e.to_string());
            }
        }
        self.progress.on_round_complete();
    }
}
