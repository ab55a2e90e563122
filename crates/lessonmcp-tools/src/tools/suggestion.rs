//! `generate_suggestion` — propose a value for a single lesson field.

use std::sync::Arc;

use async_trait::async_trait;
use lessonmcp_providers::{EngineError, RetryEngine};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::base::{parse_args, usable_materials, Materials, Tool, ToolOutput};
use crate::error::ToolError;
use crate::mappings::{map_category, map_position};
use crate::prompts::suggestion_prompt;

pub const NAME: &str = "generate_suggestion";

/// Which lesson field the suggestion is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionType {
    Topic,
    Content,
    Goals,
    Duration,
    Activity,
    Position,
    ContentGoals,
    SkillGoals,
    PriorKnowledge,
    GradeLevel,
    Category,
    Description,
}

impl SuggestionType {
    pub const ALL: [&'static str; 12] = [
        "topic",
        "content",
        "goals",
        "duration",
        "activity",
        "position",
        "contentGoals",
        "skillGoals",
        "priorKnowledge",
        "gradeLevel",
        "category",
        "description",
    ];
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionArgs {
    context: String,
    #[serde(rename = "type")]
    kind: SuggestionType,
    current_value: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    materials: Option<Materials>,
}

const BUSY_MESSAGE: &str = "המערכת עמוסה כרגע. אנא נסה שוב בעוד מספר דקות.";
const BAD_REQUEST_MESSAGE: &str = "נראה שיש בעיה בבקשה. אנא בדוק את הפרטים ונסה שוב.";
const GENERIC_MESSAGE: &str = "מצטער, נתקלנו בבעיה. אנא נסה שוב מאוחר יותר.";

/// Turn an engine failure into a user-facing Hebrew message that still
/// carries the underlying error.
fn friendly_failure(error: &EngineError) -> ToolError {
    let original = error.to_string();
    let message = if original.contains("Resource has been exhausted") || original.contains("quota") {
        BUSY_MESSAGE
    } else if original.contains("Invalid") {
        BAD_REQUEST_MESSAGE
    } else {
        GENERIC_MESSAGE
    };
    ToolError::Failed(json!({ "message": message, "originalError": original }).to_string())
}

pub struct SuggestionTool {
    engine: Arc<RetryEngine>,
}

impl SuggestionTool {
    pub fn new(engine: Arc<RetryEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for SuggestionTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Generate an AI suggestion for lesson plan content"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "context": { "type": "string" },
                "type": { "type": "string", "enum": SuggestionType::ALL },
                "currentValue": { "type": "string" },
                "message": { "type": "string" },
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
            "required": ["context", "type", "currentValue"]
        })
    }

    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let args: SuggestionArgs = parse_args(NAME, args)?;
        debug!(kind = ?args.kind, "Building suggestion prompt");

        let prompt = suggestion_prompt(
            &args.context,
            args.kind,
            &args.current_value,
            args.message.as_deref(),
            usable_materials(&args.materials),
        );

        let suggestion = match self.engine.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = ?args.kind, error = %e, "Suggestion failed");
                return Err(friendly_failure(&e));
            }
        };

        let text = match args.kind {
            SuggestionType::Position => map_position(suggestion.trim()).to_string(),
            SuggestionType::Category => map_category(suggestion.trim()).to_string(),
            _ => suggestion,
        };
        Ok(ToolOutput::text(text))
    }
}
