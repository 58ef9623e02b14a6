//! Chat model whose tool binding can be swapped between steps

use crate::ports::chat_model::{ChatModel, ModelError, StreamHandle};
use aicli_domain::{Message, ToolDefinition};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

/// Stable facade over a base model.
///
/// The agent keeps one `DynamicToolModel` for its whole lifetime and calls
/// [`reload_tools`](Self::reload_tools) before each step, so toolsets
/// enabled mid-round become visible on the next step.
pub struct DynamicToolModel {
    base: Arc<dyn ChatModel>,
    delegate: RwLock<Arc<dyn ChatModel>>,
}

impl DynamicToolModel {
    pub fn new(base: Arc<dyn ChatModel>, tools: &[ToolDefinition]) -> Result<Self, ModelError> {
        let delegate = base.with_tools(tools)?;
        Ok(Self {
            base,
            delegate: RwLock::new(delegate),
        })
    }

    /// Rebind the base model to `tools` and swap the delegate
    pub fn reload_tools(&self, tools: &[ToolDefinition]) -> Result<(), ModelError> {
        let next = self.base.with_tools(tools)?;
        *self.delegate.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn current(&self) -> Arc<dyn ChatModel> {
        self.delegate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatModel for DynamicToolModel {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn with_tools(&self, tools: &[ToolDefinition]) -> Result<Arc<dyn ChatModel>, ModelError> {
        self.base.with_tools(tools)
    }

    async fn stream(&self, messages: &[Message]) -> Result<StreamHandle, ModelError> {
        self.current().stream(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedModel;

    #[tokio::test]
    async fn test_reload_rebinds_base_model() {
        let base = ScriptedModel::new();
        let model = DynamicToolModel::new(
            Arc::new(base.clone()),
            &[ToolDefinition::new("toolset_enable", "meta")],
        )
        .unwrap();

        model
            .reload_tools(&[
                ToolDefinition::new("file_list", "list"),
                ToolDefinition::new("toolset_enable", "meta"),
            ])
            .unwrap();
        model.stream(&[Message::user("hi")]).await.unwrap();

        assert_eq!(
            base.bindings(),
            vec![
                vec!["toolset_enable".to_string()],
                vec!["file_list".to_string(), "toolset_enable".to_string()],
            ]
        );
        assert_eq!(base.calls().len(), 1);
        assert_eq!(model.name(), "scripted");
    }

    #[test]
    fn test_binding_failure_surfaces() {
        let base = Arc::new(ScriptedModel::failing_with_tools("boom"));
        let err = DynamicToolModel::new(base, &[]).err().unwrap();
        assert_eq!(err.to_string(), "boom");
    }
}
