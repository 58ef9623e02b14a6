//! Conversation session state

use super::message::{Message, Role};
use super::stream::ToolCallRequest;

/// Ordered conversation history plus the message currently being streamed.
///
/// This is plain data; concurrent access is handled by the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    system_prompt: Option<Message>,
    history: Vec<Message>,
    running: bool,
    in_progress: String,
}

impl Session {
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            system_prompt: system_prompt.map(Message::system),
            ..Default::default()
        }
    }

    pub fn system_prompt(&self) -> Option<&Message> {
        self.system_prompt.as_ref()
    }

    /// Committed history, plus the partial assistant message while a round
    /// is running and has produced text.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = self.history.clone();
        if self.running && !self.in_progress.is_empty() {
            messages.push(Message::assistant(self.in_progress.clone()));
        }
        messages
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn has_messages(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn in_progress(&self) -> &str {
        &self.in_progress
    }

    /// Messages sent to the model: system prompt first, then the committed
    /// history without error messages.
    pub fn model_input(&self) -> Vec<Message> {
        self.system_prompt
            .iter()
            .chain(self.history.iter().filter(|m| m.role != Role::Error))
            .cloned()
            .collect()
    }

    pub fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn append_partial(&mut self, chunk: &str) {
        self.in_progress.push_str(chunk);
    }

    /// Commits the partial message (if any) as an assistant message.
    pub fn commit_partial(&mut self) {
        if !self.in_progress.is_empty() {
            let text = std::mem::take(&mut self.in_progress);
            self.history.push(Message::assistant(text));
        }
    }

    /// Commits the partial text together with the tool calls it led to,
    /// as one assistant turn.
    pub fn commit_tool_calls(&mut self, calls: Vec<ToolCallRequest>) {
        let text = std::mem::take(&mut self.in_progress);
        self.history.push(Message::assistant_tool_calls(text, calls));
    }

    pub fn discard_partial(&mut self) {
        self.in_progress.clear();
    }

    /// Clears the conversation, keeping the system prompt.
    pub fn reset(&mut self) {
        self.history.clear();
        self.in_progress.clear();
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_hidden_when_not_running() {
        let mut session = Session::new(None);
        session.append_partial("Hel");
        assert!(session.messages().is_empty());

        session.set_running(true);
        assert_eq!(session.messages(), vec![Message::assistant("Hel")]);
    }

    #[test]
    fn test_empty_partial_hidden_while_running() {
        let mut session = Session::new(None);
        session.push(Message::user("Hi"));
        session.set_running(true);
        assert_eq!(session.messages(), vec![Message::user("Hi")]);
    }

    #[test]
    fn test_commit_partial() {
        let mut session = Session::new(None);
        session.set_running(true);
        session.append_partial("Hello, ");
        session.append_partial("I am here!");
        session.commit_partial();
        session.set_running(false);

        assert_eq!(session.messages(), vec![Message::assistant("Hello, I am here!")]);
        assert_eq!(session.in_progress(), "");

        session.commit_partial();
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_commit_tool_calls() {
        let mut session = Session::new(None);
        session.push(Message::user("list"));
        session.set_running(true);
        session.append_partial("Checking.");
        let call = ToolCallRequest::new("call_0", "file_list", "{}");

        session.commit_tool_calls(vec![call.clone()]);

        assert_eq!(session.in_progress(), "");
        assert_eq!(
            session.history()[1],
            Message::assistant_tool_calls("Checking.", vec![call])
        );
    }

    #[test]
    fn test_model_input_skips_errors_and_prepends_system() {
        let mut session = Session::new(Some("be brief".to_string()));
        session.push(Message::user("one"));
        session.push(Message::error("boom"));
        session.push(Message::user("two"));

        let input = session.model_input();
        assert_eq!(
            input,
            vec![Message::system("be brief"), Message::user("one"), Message::user("two")]
        );
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_reset_keeps_system_prompt() {
        let mut session = Session::new(Some("prompt".to_string()));
        session.push(Message::user("hello"));
        session.set_running(true);
        session.append_partial("partial");

        session.reset();

        assert!(!session.has_messages());
        assert!(!session.is_running());
        assert_eq!(session.system_prompt(), Some(&Message::system("prompt")));
    }
}
