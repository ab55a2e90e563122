//! `generate_full_lesson` — draft a complete lesson plan object.

use std::sync::Arc;

use async_trait::async_trait;
use lessonmcp_providers::RetryEngine;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::base::{parse_args, require_non_blank, Materials, Tool, ToolOutput};
use crate::error::{NormalizeError, ToolError};
use crate::mappings::remap_lesson;
use crate::normalize::{extract_json, greedy_span, json_type_name, strip_fences, ObjectWrap};
use crate::prompts::full_lesson_prompt;

pub const NAME: &str = "generate_full_lesson";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateArgs {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    materials: Option<Materials>,
    /// Required by the tool schema; the lesson template fixes the fields.
    #[serde(rename = "fieldLabels")]
    _field_labels: Map<String, Value>,
}

impl GenerateArgs {
    /// Present fields must be non-blank, and at least one must be present.
    fn validate(&self) -> Result<(), ToolError> {
        if let Some(topic) = &self.topic {
            require_non_blank(NAME, "topic", topic)?;
        }
        if let Some(category) = &self.category {
            require_non_blank(NAME, "category", category)?;
        }
        if self.materials.as_ref().is_some_and(Materials::is_blank) {
            return Err(ToolError::invalid(NAME, "materials must not be empty"));
        }
        if self.topic.is_none() && self.category.is_none() && self.materials.is_none() {
            return Err(ToolError::invalid(
                NAME,
                "at least one of topic, category or materials is required",
            ));
        }
        Ok(())
    }
}

/// Parse the model's lesson: as-is, then without fences, then the widest
/// `{...}` span, then via the normalizer. Anything but an object is rejected.
fn parse_lesson(response: &str) -> Result<Value, NormalizeError> {
    if let Ok(value) = serde_json::from_str::<Value>(response.trim()) {
        return expect_object(value);
    }

    let cleaned = strip_fences(response);
    if let Ok(value) = serde_json::from_str::<Value>(cleaned.trim()) {
        return expect_object(value);
    }

    // The normalizer prefers arrays, which would pick an inner list here.
    if let Some(span) = greedy_span(&cleaned, '{', '}') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(span) {
            return Ok(value);
        }
    }

    debug!("Lesson reply is not clean JSON, extracting");
    let extracted = extract_json(response, ObjectWrap::Bare)?;
    let value = serde_json::from_str(&extracted).map_err(NormalizeError::InvalidJson)?;
    expect_object(value)
}

fn expect_object(value: Value) -> Result<Value, NormalizeError> {
    if !value.is_object() {
        return Err(NormalizeError::UnexpectedShape {
            expected: "object",
            found: json_type_name(&value),
        });
    }
    Ok(value)
}

pub struct GenerateTool {
    engine: Arc<RetryEngine>,
    remap_vocabulary: bool,
}

impl GenerateTool {
    pub fn new(engine: Arc<RetryEngine>, remap_vocabulary: bool) -> Self {
        Self {
            engine,
            remap_vocabulary,
        }
    }
}

#[async_trait]
impl Tool for GenerateTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Generate a complete lesson plan from initial parameters"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string" },
                "category": { "type": "string" },
                "fieldLabels": { "type": "object" },
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
            "required": ["fieldLabels"]
        })
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: GenerateArgs = parse_args(NAME, args)?;
        args.validate()?;

        let prompt = full_lesson_prompt(
            args.topic.as_deref(),
            args.category.as_deref(),
            args.materials.as_ref(),
        );
        let response = self.engine.generate(&prompt).await?;

        let mut lesson = parse_lesson(&response)?;
        if self.remap_vocabulary {
            remap_lesson(&mut lesson);
        }
        info!(
            fields = lesson.as_object().map_or(0, |o| o.len()),
            remapped = self.remap_vocabulary,
            "Generated lesson plan"
        );

        Ok(ToolOutput::text(lesson.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{engine, ScriptedBackend};

    const LESSON: &str = r#"{"duration":"45 דקות","position":"תרגול","sections":{"opening":[{"content":"צפייה","spaceUsage":"מליאה","screen1":"סרטון"}],"main":[],"summary":[]}}"#;

    #[test]
    fn test_parse_lesson_direct() {
        let lesson = parse_lesson(LESSON).unwrap();
        assert_eq!(lesson["duration"], "45 דקות");
    }

    #[test]
    fn test_parse_lesson_fenced_with_inner_arrays() {
        let fenced = format!("```json\n{LESSON}\n```");
        let lesson = parse_lesson(&fenced).unwrap();
        assert!(lesson["sections"]["opening"].is_array());
    }

    #[test]
    fn test_parse_lesson_with_preamble() {
        let text = format!("הנה תכנון השיעור:\n{LESSON}\nבהצלחה!");
        let lesson = parse_lesson(&text).unwrap();
        assert_eq!(lesson["position"], "תרגול");
    }

    #[test]
    fn test_parse_lesson_single_array_field_with_preamble() {
        let text = "הנה התכנון המלא:\n{\"duration\":\"45 דקות\",\"goals\":[\"להבין\",\"לתרגל\"]}\nבהצלחה";
        let lesson = parse_lesson(text).unwrap();
        assert_eq!(lesson["duration"], "45 דקות");
        assert_eq!(lesson["goals"], json!(["להבין", "לתרגל"]));
    }

    #[test]
    fn test_parse_lesson_rejects_array() {
        let err = parse_lesson("[1, 2, 3]").unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::UnexpectedShape { expected: "object", found: "array" }
        ));
    }

    #[tokio::test]
    async fn test_generates_compact_object() {
        let backend = ScriptedBackend::replying(&format!("```json\n{LESSON}\n```"));
        let tool = GenerateTool::new(engine(backend.clone()), false);

        let out = tool
            .call(json!({ "topic": "מחזור המים", "fieldLabels": {} }))
            .await
            .unwrap();
        assert_eq!(out.first_text(), Some(LESSON));
        assert!(backend.prompts()[0].contains("נושא היחידה: מחזור המים"));
    }

    #[tokio::test]
    async fn test_remaps_vocabulary_when_enabled() {
        let backend = ScriptedBackend::replying(LESSON);
        let tool = GenerateTool::new(engine(backend), true);

        let out = tool
            .call(json!({ "category": "מדעים", "fieldLabels": {} }))
            .await
            .unwrap();
        let lesson: Value = serde_json::from_str(out.first_text().unwrap()).unwrap();
        assert_eq!(lesson["position"], "practice");
        assert_eq!(lesson["sections"]["opening"][0]["spaceUsage"], "whole");
        assert_eq!(lesson["sections"]["opening"][0]["screen1"], "video");
    }

    #[tokio::test]
    async fn test_requires_one_seed_field() {
        let backend = ScriptedBackend::replying("unused");
        let tool = GenerateTool::new(engine(backend.clone()), false);

        let err = tool.call(json!({ "fieldLabels": {} })).await.unwrap_err();
        assert_eq!(err.code(), -32602);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_present_field_rejected() {
        let backend = ScriptedBackend::replying("unused");
        let tool = GenerateTool::new(engine(backend.clone()), false);

        let err = tool
            .call(json!({ "topic": "  ", "category": "מדעים", "fieldLabels": {} }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("topic must not be empty"));

        let err = tool
            .call(json!({ "topic": "אור", "materials": "", "fieldLabels": {} }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = tool.call(json!({ "topic": "אור" })).await.unwrap_err();
        assert!(err.to_string().contains("fieldLabels"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_object_reply_is_unexpected_shape() {
        let backend = ScriptedBackend::replying("[\"לא\", \"אובייקט\"]");
        let tool = GenerateTool::new(engine(backend), false);

        let err = tool
            .call(json!({ "materials": "דף מידע על הירח", "fieldLabels": {} }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Normalize(NormalizeError::UnexpectedShape { .. })
        ));
        assert_eq!(err.code(), -32603);
    }
}
