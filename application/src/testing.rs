//! Test doubles shared by the application tests

use crate::ports::chat_model::{ChatModel, ModelError, StreamHandle};
use crate::ports::feature_provider::{
    Feature, InferenceProvider, ProviderError, ProviderOptions, ToolsProvider,
};
use crate::ports::mcp_client::{McpClientSession, McpConnector, McpError, RemoteTool};
use aicli_domain::{
    Availability, FeatureAttributes, McpSettings, Message, ProbeState, StreamEvent, Tool,
    ToolDefinition, ToolParameter,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub struct MockToolsProvider {
    attributes: FeatureAttributes,
    available: bool,
    probe: ProbeState,
    probes: AtomicUsize,
    tools: Vec<String>,
    settings: Option<McpSettings>,
    last_options: Mutex<Option<ProviderOptions>>,
}

impl MockToolsProvider {
    pub fn new(name: &str) -> Self {
        Self {
            attributes: FeatureAttributes::new(name, format!("{name} tools")).with_local(true),
            available: true,
            probe: ProbeState::new(),
            probes: AtomicUsize::new(0),
            tools: Vec::new(),
            settings: None,
            last_options: Mutex::new(None),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn remote(mut self) -> Self {
        self.attributes.local = false;
        self
    }

    pub fn with_tool(mut self, name: &str) -> Self {
        self.tools.push(name.to_string());
        self
    }

    pub fn with_mcp(mut self, settings: McpSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<ProviderOptions> {
        *self.last_options.lock().unwrap()
    }

    pub fn build_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|name| {
                let definition = ToolDefinition::new(name.clone(), format!("The {name} tool"))
                    .with_parameter(ToolParameter::new("input", "Input", false));
                let output = format!("{name} called");
                Tool::local(definition, self.attributes.name.clone(), move |_| Ok(output.clone()))
            })
            .collect()
    }
}

#[async_trait]
impl Feature for MockToolsProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    async fn initialize(&self, options: &ProviderOptions) {
        self.probes.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(*options);
        self.probe.set(if self.available {
            Availability::available("mock available")
        } else {
            Availability::unavailable("mock unavailable")
        });
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl ToolsProvider for MockToolsProvider {
    async fn get_tools(&self) -> Result<Vec<Tool>, ProviderError> {
        Ok(self.build_tools())
    }

    fn mcp_settings(&self) -> Option<McpSettings> {
        self.settings.clone()
    }
}

pub struct MockInferenceProvider {
    attributes: FeatureAttributes,
    available: bool,
    probe: ProbeState,
    probes: AtomicUsize,
    model: Option<Arc<dyn ChatModel>>,
}

impl MockInferenceProvider {
    pub fn new(name: &str) -> Self {
        Self {
            attributes: FeatureAttributes::new(name, format!("{name} inference")),
            available: true,
            probe: ProbeState::new(),
            probes: AtomicUsize::new(0),
            model: None,
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn local(mut self) -> Self {
        self.attributes.local = true;
        self
    }

    pub fn with_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Feature for MockInferenceProvider {
    fn attributes(&self) -> &FeatureAttributes {
        &self.attributes
    }

    async fn initialize(&self, _options: &ProviderOptions) {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probe.set(if self.available {
            Availability::available("mock available")
        } else {
            Availability::unavailable("mock unavailable")
        });
    }

    fn is_available(&self) -> bool {
        self.probe.is_available()
    }

    fn reason(&self) -> String {
        self.probe.reason()
    }
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    fn models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    async fn get_inference(&self, _model: Option<&str>) -> Result<Arc<dyn ChatModel>, ModelError> {
        self.model
            .clone()
            .ok_or_else(|| ModelError::ModelNotAvailable(self.attributes.name.clone()))
    }
}

#[derive(Default)]
struct ScriptState {
    steps: Mutex<VecDeque<Vec<StreamEvent>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    bindings: Mutex<Vec<Vec<String>>>,
    with_tools_error: Option<String>,
}

/// Model that replays scripted steps and records its inputs.
///
/// Once the script is exhausted every step answers "ok".
#[derive(Clone, Default)]
pub struct ScriptedModel {
    state: Arc<ScriptState>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with_tools(error: &str) -> Self {
        Self {
            state: Arc::new(ScriptState {
                with_tools_error: Some(error.to_string()),
                ..Default::default()
            }),
        }
    }

    pub fn step(self, events: Vec<StreamEvent>) -> Self {
        self.state.steps.lock().unwrap().push_back(events);
        self
    }

    pub fn reply(self, text: &str) -> Self {
        self.step(vec![StreamEvent::Delta(text.to_string()), StreamEvent::Completed])
    }

    /// Messages received by each step
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.state.calls.lock().unwrap().clone()
    }

    /// Tool names bound by each `with_tools` call
    pub fn bindings(&self) -> Vec<Vec<String>> {
        self.state.bindings.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn with_tools(&self, tools: &[ToolDefinition]) -> Result<Arc<dyn ChatModel>, ModelError> {
        if let Some(error) = &self.state.with_tools_error {
            return Err(ModelError::Other(error.clone()));
        }
        self.state
            .bindings
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());
        Ok(Arc::new(self.clone()))
    }

    async fn stream(&self, messages: &[Message]) -> Result<StreamHandle, ModelError> {
        self.state.calls.lock().unwrap().push(messages.to_vec());
        let events = self
            .state
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![StreamEvent::Delta("ok".to_string()), StreamEvent::Completed]);
        Ok(StreamHandle::from_events(events))
    }
}

pub struct MockMcpSession {
    tools: Vec<RemoteTool>,
    fail_list: bool,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl MockMcpSession {
    pub fn new(tools: &[&str]) -> Self {
        Self {
            tools: tools
                .iter()
                .map(|name| RemoteTool {
                    name: name.to_string(),
                    description: Some("A test tool".to_string()),
                    input_schema: json!({
                        "type": "object",
                        "properties": {"query": {"type": "string"}},
                        "required": ["query"]
                    }),
                })
                .collect(),
            fail_list: false,
            closed: AtomicBool::new(false),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), McpError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(McpError::ConnectionClosed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl McpClientSession for MockMcpSession {
    async fn list_tools(&self) -> Result<Vec<RemoteTool>, McpError> {
        self.check_open()?;
        if self.fail_list {
            return Err(McpError::Transport("list failed".to_string()));
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        self.check_open()?;
        Ok(json!({
            "content": [{"type": "text", "text": "test-works"}],
            "tool": name,
            "arguments": arguments,
        }))
    }

    async fn ping(&self) -> Result<(), McpError> {
        self.check_open()
    }

    async fn close(&self) -> Result<(), McpError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct MockConnector {
    sessions: Mutex<HashMap<String, Arc<MockMcpSession>>>,
    refused: HashSet<String>,
    connects: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, provider: &str, session: MockMcpSession) -> Self {
        self.sessions
            .lock()
            .unwrap()
            .insert(provider.to_string(), Arc::new(session));
        self
    }

    pub fn refusing(mut self, provider: &str) -> Self {
        self.refused.insert(provider.to_string());
        self
    }

    pub fn session(&self, provider: &str) -> Option<Arc<MockMcpSession>> {
        self.sessions.lock().unwrap().get(provider).cloned()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl McpConnector for MockConnector {
    async fn connect(
        &self,
        provider: &str,
        _settings: &McpSettings,
        _cancel: CancellationToken,
    ) -> Result<Arc<dyn McpClientSession>, McpError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refused.contains(provider) {
            return Err(McpError::ConnectFailed("connection refused".to_string()));
        }
        let session: Arc<dyn McpClientSession> = self
            .session(provider)
            .unwrap_or_else(|| Arc::new(MockMcpSession::new(&[])));
        Ok(session)
    }
}
