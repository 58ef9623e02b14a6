//! Progress display for conversation rounds

use aicli_application::AgentProgressNotifier;
use aicli_domain::ToolError;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Spinner plus one line per tool call.
///
/// Also signals the REPL when a round is over.
pub struct ReplProgress {
    spinner: Mutex<Option<ProgressBar>>,
    chunks: Mutex<usize>,
    round_done: Notify,
    quiet: bool,
}

impl ReplProgress {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            chunks: Mutex::new(0),
            round_done: Notify::new(),
            quiet: false,
        }
    }

    /// No terminal output, only round notifications
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::new()
        }
    }

    /// Wait for the running round to finish
    pub async fn wait_round(&self) {
        self.round_done.notified().await;
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(pb) = self.spinner.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            f(pb);
        }
    }

    fn finish_spinner(&self) {
        if let Some(pb) = self.spinner.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pb.finish_and_clear();
        }
    }

    pub fn chunk_count(&self) -> usize {
        *self.chunks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReplProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentProgressNotifier for ReplProgress {
    fn on_model_step(&self, step: usize) {
        *self.chunks.lock().unwrap_or_else(PoisonError::into_inner) = 0;
        if self.quiet {
            return;
        }
        self.finish_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("step {step}"));
        pb.set_message("thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_llm_chunk(&self, _chunk: &str) {
        let count = {
            let mut chunks = self.chunks.lock().unwrap_or_else(PoisonError::into_inner);
            *chunks += 1;
            *chunks
        };
        self.with_spinner(|pb| pb.set_message(format!("receiving ({count} chunks)")));
    }

    fn on_tool_call_start(&self, tool_name: &str, _arguments: &str) {
        self.with_spinner(|pb| pb.set_message(format!("running {tool_name}")));
    }

    fn on_tool_call_end(&self, tool_name: &str, result: Result<&str, &ToolError>) {
        if self.quiet {
            return;
        }
        let line = match result {
            Ok(_) => format!("  {} {}", "v".green(), tool_name),
            Err(e) => format!("  {} {} ({})", "x".red(), tool_name, e),
        };
        match self.spinner.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }

    fn on_round_complete(&self) {
        self.finish_spinner();
        self.round_done.notify_one();
    }
}
