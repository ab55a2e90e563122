//! `chat_with_context` — free-form conversation about the lesson being planned.

use std::sync::Arc;

use async_trait::async_trait;
use lessonmcp_providers::RetryEngine;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::base::{parse_args, usable_materials, HistoryEntry, Materials, Tool, ToolOutput};
use crate::error::ToolError;
use crate::prompts::chat_prompt;

pub const NAME: &str = "chat_with_context";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatArgs {
    message: String,
    current_values: Map<String, Value>,
    history: Vec<HistoryEntry>,
    field_labels: Map<String, Value>,
    #[serde(default)]
    materials: Option<Materials>,
}

pub struct ChatTool {
    engine: Arc<RetryEngine>,
}

impl ChatTool {
    pub fn new(engine: Arc<RetryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for ChatTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Chat with AI about lesson planning with context"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "currentValues": { "type": "object" },
                "fieldLabels": { "type": "object" },
                "history": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "text": { "type": "string" },
                            "sender": { "type": "string", "enum": ["user", "ai"] },
                            "timestamp": { "type": "string" }
                        },
                        "required": ["text", "sender"]
                    }
                },
                "materials": {
                    "oneOf": [
                        { "type": "string" },
                        {
                            "type": "object",
                            "properties": {
                                "title": { "type": "string" },
                                "content": { "type": "string" }
                            },
                            "required": ["title", "content"]
                        }
                    ],
                    "description": "Optional learning materials provided by the user"
                }
            },
            "required": ["message", "currentValues", "history", "fieldLabels"]
        })
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: ChatArgs = parse_args(NAME, args)?;
        debug!(
            fields = args.current_values.len(),
            history = args.history.len(),
            "Building chat prompt"
        );

        let prompt = chat_prompt(
            &args.message,
            &args.current_values,
            &args.field_labels,
            &args.history,
            usable_materials(&args.materials),
        );
        let response = self.engine.generate(&prompt).await?;

        Ok(ToolOutput::text(json!({ "response": response }).to_string()))
    }
}
