//! Tool trait and the argument types shared by the lesson tools.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ToolError;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every lesson tool implements this trait.
///
/// The transports list tools via `to_descriptor()` and dispatch calls by
/// `name()` through the registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used by callers (e.g. `"chat_with_context"`).
    fn name(&self) -> &str;

    /// Human-readable description for the catalog.
    fn description(&self) -> &str;

    /// JSON Schema describing the arguments. Descriptive only; validation
    /// happens in `call`.
    fn input_schema(&self) -> Value;

    /// Validate `args`, run one completion and shape the result.
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError>;

    /// Catalog entry: `{name, description, inputSchema}`.
    fn to_descriptor(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }
}

// ─────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Result of a successful tool call, serialized as `{"content": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<ToolContent>,
}

impl ToolOutput {
    /// Single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent {
                kind: "text".into(),
                text: text.into(),
            }],
        }
    }

    /// Text of the first content item, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| c.text.as_str())
    }
}

// ─────────────────────────────────────────────
// Argument helpers
// ─────────────────────────────────────────────

/// Deserialize the argument object for `tool`.
///
/// Non-object arguments are rejected up front: serde would otherwise accept
/// a positional array for a struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    if !args.is_object() {
        return Err(ToolError::invalid(tool, "arguments must be a JSON object"));
    }
    serde_json::from_value(args).map_err(|e| ToolError::invalid(tool, e.to_string()))
}

/// Reject a string that is empty after trimming.
pub fn require_non_blank(tool: &str, field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::invalid(tool, format!("{field} must not be empty")));
    }
    Ok(())
}

/// Learning materials supplied by the user: free text or a titled document.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Materials {
    Text(String),
    Document { title: String, content: String },
}

impl Materials {
    pub fn is_blank(&self) -> bool {
        match self {
            Materials::Text(text) => text.trim().is_empty(),
            Materials::Document { title, content } => {
                title.trim().is_empty() && content.trim().is_empty()
            }
        }
    }

    /// Body of a `[חומרי עזר]` prompt section.
    pub fn section_body(&self) -> String {
        match self {
            Materials::Text(text) => text.clone(),
            Materials::Document { title, content } => format!("כותרת: {title}\nתוכן: {content}"),
        }
    }

    /// Title and content on separate lines, without labels.
    pub fn plain(&self) -> String {
        match self {
            Materials::Text(text) => text.clone(),
            Materials::Document { title, content } => format!("{title}\n{content}"),
        }
    }
}

/// `Some` only for materials worth mentioning in a prompt.
pub fn usable_materials(materials: &Option<Materials>) -> Option<&Materials> {
    materials.as_ref().filter(|m| !m.is_blank())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Speaker label used in the conversation history block.
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "משתמש",
            Sender::Ai => "מערכת",
        }
    }
}

/// One turn of the chat history.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Label for `key`: its entry in `field_labels` when that is a non-empty
/// string, otherwise the key itself.
pub fn field_label<'a>(field_labels: &'a Map<String, Value>, key: &'a str) -> &'a str {
    field_labels
        .get(key)
        .and_then(Value::as_str)
        .filter(|label| !label.is_empty())
        .unwrap_or(key)
}

/// Render a current field value, `(ריק)` for absent, null or empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "(ריק)".to_string(),
        Some(Value::String(s)) if s.is_empty() => "(ריק)".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
