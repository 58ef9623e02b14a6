//! REPL (Read-Eval-Print Loop) for interactive chat

use super::progress::ReplProgress;
use crate::ConsoleFormatter;
use aicli_application::ConversationAgent;
use aicli_domain::{Message, Role};
use colored::Colorize;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Quit,
}

/// Interactive chat REPL
pub struct ChatRepl {
    agent: Arc<ConversationAgent>,
    progress: Arc<ReplProgress>,
    /// Transcript messages already shown
    printed: usize,
}

impl ChatRepl {
    /// `progress` must be the notifier the agent was built with
    pub fn new(agent: Arc<ConversationAgent>, progress: Arc<ReplProgress>) -> Self {
        let printed = agent.shared_session().messages().len();
        Self {
            agent,
            progress,
            printed,
        }
    }

    /// Run the REPL on standard input until `/quit`, EOF or cancellation
    pub async fn run(&mut self, cancel: CancellationToken) -> std::io::Result<()> {
        self.print_welcome();
        self.run_with(BufReader::new(tokio::io::stdin()), cancel).await
    }

    pub async fn run_with<R>(&mut self, reader: R, cancel: CancellationToken) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let loop_handle = self.agent.clone().run(cancel.clone());
        let mut lines = reader.lines();

        loop {
            print_prompt();
            let line = tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                println!("Bye!");
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('/') {
                if self.handle_command(line) == CommandOutcome::Quit {
                    break;
                }
                continue;
            }

            if !self.submit(line, &cancel).await {
                break;
            }
        }

        cancel.cancel();
        if let Err(e) = loop_handle.await {
            debug!(error = %e, "Conversation loop task ended abnormally");
        }
        Ok(())
    }

    /// Send one user message and wait for its round. `false` when cancelled.
    async fn submit(&mut self, text: &str, cancel: &CancellationToken) -> bool {
        if self.agent.input().send(Message::user(text)).is_err() {
            return false;
        }
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = self.progress.wait_round() => {}
        }
        self.print_delta();
        true
    }

    fn print_delta(&mut self) {
        let messages = self.agent.shared_session().messages();
        for message in messages.iter().skip(self.printed) {
            if message.role == Role::User {
                continue;
            }
            println!("{}", ConsoleFormatter::format_message(message));
        }
        println!();
        self.printed = messages.len();
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "ai-cli chat".cyan().bold());
        println!();
        println!("{}", "Commands:".bold());
        println!("  /tools    - Show toolsets and enabled tools");
        println!("  /reset    - Clear the conversation");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands
    pub fn handle_command(&mut self, cmd: &str) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Quit
            }
            "/reset" => {
                self.agent.reset();
                self.printed = self.agent.shared_session().messages().len();
                println!("{}", "Conversation cleared.".dimmed());
                CommandOutcome::Continue
            }
            "/tools" => {
                println!("{}", self.tools_summary());
                CommandOutcome::Continue
            }
            "/help" | "/h" | "/?" => {
                self.print_welcome();
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }

    fn tools_summary(&self) -> String {
        let manager = self.agent.tool_manager();
        let mut output = format!(
            "{} {}\n",
            "Toolsets:".cyan().bold(),
            manager.toolsets().join(", ")
        );
        output.push_str(&format!(
            "{} {} of {}\n",
            "Enabled tools:".cyan().bold(),
            manager.tool_enabled_count(),
            manager.tool_count()
        ));
        for tool in manager.enabled_tools() {
            output.push_str(&format!("  - {}\n", tool.name()));
        }
        output
    }

    /// Transcript messages already printed
    pub fn printed(&self) -> usize {
        self.printed
    }
}

fn print_prompt() {
    use std::io::Write;
    print!(">>> ");
    let _ = std::io::stdout().flush();
}
