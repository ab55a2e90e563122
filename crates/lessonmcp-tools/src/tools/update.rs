//! `update_lesson_field` — turn a user request into field updates.
//!
//! The model is asked for an array of `{field, chat, value}`; a lone object
//! is wrapped so callers always receive an array.

use std::sync::Arc;

use async_trait::async_trait;
use lessonmcp_providers::RetryEngine;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::base::{parse_args, require_non_blank, usable_materials, Materials, Tool, ToolOutput};
use crate::error::ToolError;
use crate::normalize::{extract_json, ObjectWrap};
use crate::prompts::update_prompt;

pub const NAME: &str = "update_lesson_field";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateArgs {
    message: String,
    field_labels: Map<String, Value>,
    current_values: Map<String, Value>,
    /// Accepted for compatibility with existing callers; not used in the prompt.
    #[serde(default)]
    rephrase: Option<bool>,
    #[serde(default)]
    materials: Option<Materials>,
}

pub struct UpdateTool {
    engine: Arc<RetryEngine>,
}

impl UpdateTool {
    pub fn new(engine: Arc<RetryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for UpdateTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Parse user message and update lesson field"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "fieldLabels": { "type": "object" },
                "currentValues": { "type": "object" },
                "rephrase": { "type": "boolean" },
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
            "required": ["message", "fieldLabels", "currentValues"]
        })
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: UpdateArgs = parse_args(NAME, args)?;
        require_non_blank(NAME, "message", &args.message)?;
        debug!(
            fields = args.field_labels.len(),
            rephrase = ?args.rephrase,
            "Building update prompt"
        );

        let prompt = update_prompt(
            &args.message,
            &args.field_labels,
            &args.current_values,
            usable_materials(&args.materials),
        );
        let response = self.engine.generate(&prompt).await?;
        let updates = extract_json(&response, ObjectWrap::WrapInArray)?;
        debug!(len = updates.len(), "Normalized field updates");

        Ok(ToolOutput::text(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizeError;
    use crate::tools::testing::{engine, ScriptedBackend};

    fn valid_args() -> Value {
        json!({
            "message": "שנה את הזמן ל-45 דקות",
            "fieldLabels": { "duration": "זמן כולל", "topic": "נושא היחידה" },
            "currentValues": { "duration": "30 דקות" },
            "rephrase": false
        })
    }

    #[tokio::test]
    async fn test_fenced_array_passes_through() {
        let reply = "```json\n[{\"field\":\"duration\",\"chat\":\"עודכן <שדה: זמן כולל>\",\"value\":\"45 דקות\"}]\n```";
        let backend = ScriptedBackend::replying(reply);
        let tool = UpdateTool::new(engine(backend.clone()));

        let out = tool.call(valid_args()).await.unwrap();
        let parsed: Value = serde_json::from_str(out.first_text().unwrap()).unwrap();
        assert_eq!(parsed[0]["field"], "duration");
        assert_eq!(parsed[0]["value"], "45 דקות");

        let prompt = &backend.prompts()[0];
        assert!(prompt.contains("זמן כולל: 30 דקות"));
        assert!(prompt.contains("נושא היחידה: (ריק)"));
    }

    #[tokio::test]
    async fn test_single_object_is_wrapped() {
        let backend =
            ScriptedBackend::replying("בבקשה: {\"field\":\"topic\",\"chat\":\"c\",\"value\":\"v\"}");
        let tool = UpdateTool::new(engine(backend));

        let out = tool.call(valid_args()).await.unwrap();
        let parsed: Value = serde_json::from_str(out.first_text().unwrap()).unwrap();
        assert!(parsed.is_array());
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["field"], "topic");
    }

    #[tokio::test]
    async fn test_prose_reply_is_normalize_error() {
        let backend = ScriptedBackend::replying("אני לא בטוח מה לשנות");
        let tool = UpdateTool::new(engine(backend));

        let err = tool.call(valid_args()).await.unwrap_err();
        assert!(matches!(err, ToolError::Normalize(NormalizeError::NoJsonFound)));
        assert_eq!(err.code(), -32603);
    }

    #[tokio::test]
    async fn test_blank_message_rejected_without_call() {
        let backend = ScriptedBackend::replying("unused");
        let tool = UpdateTool::new(engine(backend.clone()));

        let mut args = valid_args();
        args["message"] = json!("   ");
        let err = tool.call(args).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_field_labels_must_be_object() {
        let backend = ScriptedBackend::replying("unused");
        let tool = UpdateTool::new(engine(backend.clone()));

        let mut args = valid_args();
        args["fieldLabels"] = json!(["duration"]);
        assert_eq!(tool.call(args).await.unwrap_err().code(), -32602);

        let mut args = valid_args();
        args["rephrase"] = json!("yes");
        assert_eq!(tool.call(args).await.unwrap_err().code(), -32602);
        assert_eq!(backend.call_count(), 0);
    }
}
