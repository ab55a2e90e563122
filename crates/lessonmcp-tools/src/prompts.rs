//! Prompt builders for the four lesson tools.
//!
//! Static instruction blocks live under `templates/`; this module only
//! stitches the caller's lesson state into them.

use serde_json::{Map, Value};

use crate::mappings::{CATEGORIES, POSITIONS};
use crate::tools::base::{display_value, field_label, HistoryEntry, Materials};
use crate::tools::suggestion::SuggestionType;

const CHAT_GUIDELINES: &str = include_str!("../templates/chat_guidelines.md");
const UPDATE_INSTRUCTIONS: &str = include_str!("../templates/update_instructions.md");
const UPDATE_OUTPUT_RULES: &str = include_str!("../templates/update_output_rules.md");
const LESSON_INSTRUCTIONS: &str = include_str!("../templates/lesson_instructions.md");

/// Categories offered in suggestions beyond the mapped ones.
const EXTRA_CATEGORIES: &[&str] = &[
    "טכנולוגיה",
    "כלכלה",
    "סטטיסטיקה",
    "פיננסים",
    "מנהיגות",
    "תקשורת",
    "ארכיטקטורה",
    "עיצוב",
    "פיתוח תוכנה",
    "בינה מלאכותית",
    "אבטחת מידע",
];

fn materials_section(materials: Option<&Materials>) -> String {
    materials
        .map(|m| format!("\n[חומרי עזר]\n{}", m.section_body()))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────
// chat_with_context
// ─────────────────────────────────────────────

pub fn chat_prompt(
    message: &str,
    current_values: &Map<String, Value>,
    field_labels: &Map<String, Value>,
    history: &[HistoryEntry],
    materials: Option<&Materials>,
) -> String {
    let context = current_values
        .iter()
        .map(|(key, value)| format!("{}: {}", field_label(field_labels, key), display_value(Some(value))))
        .collect::<Vec<_>>()
        .join("\n");

    let history = history
        .iter()
        .map(|entry| format!("{}: {}", entry.sender.label(), entry.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "אתה עוזר למורים לתכנן שיעורים בחדר אימרסיבי אבל גם יכול לעשות שיחות חולין - אבל אל תחפור תענה בקצרה.\n\
         \n\
         [מצב נוכחי של השיעור]\n\
         {context}\n\
         {materials}\n\
         \n\
         [היסטוריית השיחה]\n\
         {history}\n\
         \n\
         [הנחיות]\n\
         \n\
         {CHAT_GUIDELINES}\n\
         [בקשת המשתמש]\n\
         {message}\n\
         \n\
         ענה בצורה מקצועית, תוך התייחסות להקשר השיעור. אל תציין שאתה AI, פשוט ענה כמומחה מקצועי.",
        materials = materials_section(materials),
    )
}

// ─────────────────────────────────────────────
// generate_suggestion
// ─────────────────────────────────────────────

fn must_choose(options: impl Iterator<Item = &'static str>) -> String {
    let mut text = String::from("חובה לבחור ערך אחד בדיוק מתוך האפשרויות הבאות בלבד:\n");
    for option in options {
        text.push_str("* ");
        text.push_str(option);
        text.push('\n');
    }
    text.push_str("\nאסור להציע ערכים אחרים! חובה לבחור מהרשימה הזו בדיוק.");
    text
}

/// Closing instruction for a suggestion of the given type.
pub fn suggestion_instruction(kind: SuggestionType) -> String {
    match kind {
        SuggestionType::Topic => "הצע נושא יחידה מתאים שיתאים להוראה בחדר אימרסיבי.".into(),
        SuggestionType::Content => "הצע תיאור מפורט לפעילות לימודית שתתאים לחדר אימרסיבי.".into(),
        SuggestionType::ContentGoals => "הצע מטרות למידה ספציפיות ומדידות ברמת התוכן.".into(),
        SuggestionType::SkillGoals => "הצע מטרות למידה ספציפיות ומדידות ברמת המיומנויות.".into(),
        SuggestionType::PriorKnowledge => "הצע ידע קודם נדרש לפעילות זו.".into(),
        SuggestionType::GradeLevel => "הצע שכבת גיל מתאימה לפעילות זו.".into(),
        SuggestionType::Duration => {
            "הצע משך זמן מתאים לפעילות זו, תוך התחשבות באופי הפעילות וקהל היעד.".into()
        }
        SuggestionType::Activity => {
            "הצע פעילות לימודית שתנצל את היכולות הייחודיות של החדר האימרסיבי.".into()
        }
        SuggestionType::Position => must_choose(POSITIONS.iter().map(|(hebrew, _)| *hebrew)),
        SuggestionType::Category => must_choose(
            CATEGORIES
                .iter()
                .map(|(hebrew, _)| *hebrew)
                .chain(EXTRA_CATEGORIES.iter().copied()),
        ),
        SuggestionType::Goals | SuggestionType::Description => {
            "הצע שיפור או חלופה לתוכן הנוכחי.".into()
        }
    }
}

pub fn suggestion_prompt(
    context: &str,
    kind: SuggestionType,
    current_value: &str,
    message: Option<&str>,
    materials: Option<&Materials>,
) -> String {
    let mut prompt = format!("בהתבסס על ההקשר הבא: \"{context}\"\n");

    if let Some(materials) = materials {
        prompt.push_str(&format!("\nוחומרי העזר הבאים:\n{}", materials.plain()));
    }

    let current = if current_value.is_empty() { "ריק" } else { current_value };
    prompt.push_str(&format!("\nוהתוכן הנוכחי: \"{current}\""));

    if let Some(message) = message.filter(|m| !m.is_empty()) {
        prompt.push_str(&format!("\nבהתייחס להודעה הבאה: \"{message}\""));
    }

    prompt.push_str("\n\n");
    prompt.push_str(&suggestion_instruction(kind));
    prompt
}

// ─────────────────────────────────────────────
// update_lesson_field
// ─────────────────────────────────────────────

/// Iterates `field_labels` (not `current_values`) so the model sees every
/// field the caller can accept, including empty ones.
pub fn update_prompt(
    message: &str,
    field_labels: &Map<String, Value>,
    current_values: &Map<String, Value>,
    materials: Option<&Materials>,
) -> String {
    let mapping = field_labels
        .iter()
        .map(|(key, _)| format!("\"{}\": \"{key}\"", field_label(field_labels, key)))
        .collect::<Vec<_>>()
        .join("\n");

    let state = field_labels
        .iter()
        .map(|(key, _)| {
            format!(
                "{}: {}",
                field_label(field_labels, key),
                display_value(current_values.get(key))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{UPDATE_INSTRUCTIONS}\n\
         [מיפוי שדות]\n\
         {mapping}\n\
         \n\
         [מצב נוכחי של השדות]\n\
         {state}\n\
         {materials}\n\
         \n\
         [בקשת המשתמש]\n\
         {message}\n\
         \n\
         {UPDATE_OUTPUT_RULES}",
        materials = materials_section(materials),
    )
}

// ─────────────────────────────────────────────
// generate_full_lesson
// ─────────────────────────────────────────────

pub fn full_lesson_prompt(
    topic: Option<&str>,
    category: Option<&str>,
    materials: Option<&Materials>,
) -> String {
    let mut prompt = String::from(
        "אתה עוזר למורים לתכנן שיעורים בחדר אימרסיבי. עליך ליצור תכנון שיעור מלא בהתבסס על המידע הבא:\n\n[מידע על השיעור]",
    );

    if let Some(materials) = materials {
        prompt.push_str("\n\n[חומרי עזר]\n");
        prompt.push_str(&materials.section_body());
    }

    let mut existing = Vec::new();
    if let Some(topic) = topic {
        existing.push(format!("נושא היחידה: {topic}"));
    }
    if let Some(category) = category {
        existing.push(format!("קטגוריה: {category}"));
    }
    match materials {
        Some(Materials::Document { title, content }) => {
            existing.push(format!("כותרת חומרי עזר: {title}"));
            existing.push(format!("חומרי עזר: {content}"));
        }
        Some(Materials::Text(text)) => existing.push(format!("חומרי עזר: {text}")),
        None => {}
    }
    if !existing.is_empty() {
        prompt.push_str("\nשדות קיימים:\n");
        prompt.push_str(&existing.join("\n"));
    }

    prompt.push_str("\n\n[דרישות מיוחדות]\n");
    let mut requirements = Vec::new();
    match (topic, category) {
        (None, None) if materials.is_some() => requirements.push(
            "- יש להציע נושא יחידה וקטגוריה מתאימים בהתבסס על חומרי העזר שסופקו".to_string(),
        ),
        (None, Some(category)) => requirements.push(format!(
            "- יש להציע נושא יחידה שמתאים לקטגוריה \"{category}\" ובהתבסס על חומרי העזר במידה שסופקו"
        )),
        (Some(topic), None) => requirements.push(format!(
            "- יש להציע קטגוריה מתאימה לנושא היחידה \"{topic}\" ובהתבסס על חומרי העזר במידה שסופקו"
        )),
        _ => {}
    }
    requirements.push("- אין להחזיר בתשובה שדות שכבר קיימים:".to_string());
    if topic.is_some() {
        requirements.push("  * אין להחזיר את שדה 'topic' כי כבר קיים".to_string());
    }
    if category.is_some() {
        requirements.push("  * אין להחזיר את שדה 'category' כי כבר קיים".to_string());
    }
    prompt.push_str(&requirements.join("\n"));

    prompt.push('\n');
    prompt.push_str(LESSON_INSTRUCTIONS);
    prompt
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
