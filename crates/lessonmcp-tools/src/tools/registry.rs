//! Tool registry — name → handler lookup plus the static catalog.

use std::collections::HashMap;
use std::sync::Arc;

use lessonmcp_core::config::ToolsConfig;
use lessonmcp_providers::RetryEngine;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::base::{Tool, ToolOutput};
use super::{chat, generate, suggestion, update};
use crate::error::ToolError;
use crate::tools::chat::ChatTool;
use crate::tools::generate::GenerateTool;
use crate::tools::suggestion::SuggestionTool;
use crate::tools::update::UpdateTool;

/// Catalog order for list requests.
const CATALOG_ORDER: [&str; 4] = [chat::NAME, suggestion::NAME, update::NAME, generate::NAME];

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls. Read-only once built,
/// so it can be shared behind an `Arc` by every transport.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// The four lesson tools over one shared engine.
    pub fn lesson_tools(engine: Arc<RetryEngine>, config: &ToolsConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ChatTool::new(engine.clone())));
        registry.register(Arc::new(SuggestionTool::new(engine.clone())));
        registry.register(Arc::new(UpdateTool::new(engine.clone())));
        registry.register(Arc::new(GenerateTool::new(
            engine,
            config.remap_lesson_vocabulary,
        )));
        registry
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), "registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// `{"tools": [...]}` with the lesson tools in their fixed order first,
    /// then any others by name.
    pub fn catalog(&self) -> Value {
        let mut tools: Vec<Value> = CATALOG_ORDER
            .iter()
            .filter_map(|name| self.tools.get(*name))
            .map(|tool| tool.to_descriptor())
            .collect();
        tools.extend(
            self.tool_names()
                .iter()
                .filter(|name| !CATALOG_ORDER.contains(&name.as_str()))
                .filter_map(|name| self.tools.get(name))
                .map(|tool| tool.to_descriptor()),
        );
        json!({ "tools": tools })
    }

    /// Dispatch a call by tool name.
    pub async fn call(&self, name: &str, args: Value) -> Result<ToolOutput, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "tool not found");
            return Err(ToolError::NotFound(name.to_string()));
        };

        match tool.call(args).await {
            Ok(output) => Ok(output),
            Err(e) => {
                warn!(tool = name, code = e.code(), error = %e, "tool call failed");
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
