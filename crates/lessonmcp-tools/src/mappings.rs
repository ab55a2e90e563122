//! Hebrew → canonical English vocabulary for lesson plan fields.
//!
//! The UI stores enumerated fields (position, category, space usage, screen
//! type) as English keys while the model answers in Hebrew. Unmapped values
//! pass through unchanged.

use serde_json::Value;

pub static POSITIONS: &[(&str, &str)] = &[
    ("פתיחת נושא", "opening"),
    ("הקנייה", "teaching"),
    ("תרגול", "practice"),
    ("סיכום נושא", "summary"),
];

pub static SPACE_USAGE: &[(&str, &str)] = &[
    ("מליאה", "whole"),
    ("עבודה בקבוצות", "groups"),
    ("עבודה אישית", "individual"),
    ("משולב", "mixed"),
];

pub static SCREEN_TYPES: &[(&str, &str)] = &[
    ("סרטון", "video"),
    ("תמונה", "image"),
    ("פדלט", "padlet"),
    ("אתר", "website"),
    ("ג'ניאלי", "genially"),
    ("מצגת", "presentation"),
];

pub static CATEGORIES: &[(&str, &str)] = &[
    ("מתמטיקה", "mathematics"),
    ("אנגלית", "english"),
    ("עברית", "hebrew"),
    ("תנ״ך", "bible"),
    ("היסטוריה", "history"),
    ("אזרחות", "civics"),
    ("ספרות", "literature"),
    ("פיזיקה", "physics"),
    ("כימיה", "chemistry"),
    ("ביולוגיה", "biology"),
    ("מדעים", "science"),
    ("גיאוגרפיה", "geography"),
    ("מחשבים", "computers"),
    ("אומנות", "art"),
    ("מוזיקה", "music"),
    ("חינוך גופני", "physical_education"),
    ("פילוסופיה", "philosophy"),
    ("פסיכולוגיה", "psychology"),
    ("סוציולוגיה", "sociology"),
    ("חינוך חברתי", "social_education"),
];

fn lookup<'a>(table: &'static [(&'static str, &'static str)], value: &'a str) -> &'a str {
    table
        .iter()
        .find(|(hebrew, _)| *hebrew == value)
        .map(|(_, english)| *english)
        .unwrap_or(value)
}

pub fn map_position(value: &str) -> &str {
    lookup(POSITIONS, value)
}

pub fn map_space_usage(value: &str) -> &str {
    lookup(SPACE_USAGE, value)
}

pub fn map_screen_type(value: &str) -> &str {
    lookup(SCREEN_TYPES, value)
}

pub fn map_category(value: &str) -> &str {
    lookup(CATEGORIES, value)
}

/// Replace a string field in place using `map`.
fn remap_field(obj: &mut serde_json::Map<String, Value>, key: &str, map: fn(&str) -> &str) {
    if let Some(Value::String(s)) = obj.get_mut(key) {
        let mapped = map(s.trim()).to_string();
        if mapped != *s {
            *s = mapped;
        }
    }
}

/// Rewrite the enumerated fields of a generated lesson plan to English keys.
///
/// Touches `position`, `category`, and for every activity under
/// `sections.{opening,main,summary}`: `spaceUsage` and `screen1..3`.
pub fn remap_lesson(lesson: &mut Value) {
    let Some(obj) = lesson.as_object_mut() else {
        return;
    };

    remap_field(obj, "position", map_position);
    remap_field(obj, "category", map_category);

    let Some(sections) = obj.get_mut("sections").and_then(Value::as_object_mut) else {
        return;
    };
    for stage in ["opening", "main", "summary"] {
        let Some(activities) = sections.get_mut(stage).and_then(Value::as_array_mut) else {
            continue;
        };
        for activity in activities.iter_mut().filter_map(Value::as_object_mut) {
            remap_field(activity, "spaceUsage", map_space_usage);
            for screen in ["screen1", "screen2", "screen3"] {
                remap_field(activity, screen, map_screen_type);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_sizes() {
        assert_eq!(POSITIONS.len(), 4);
        assert_eq!(SPACE_USAGE.len(), 4);
        assert_eq!(SCREEN_TYPES.len(), 6);
        assert_eq!(CATEGORIES.len(), 20);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(map_position("הקנייה"), "teaching");
        assert_eq!(map_category("תנ״ך"), "bible");
        assert_eq!(map_category("חינוך גופני"), "physical_education");
        assert_eq!(map_screen_type("ג'ניאלי"), "genially");
        assert_eq!(map_space_usage("עבודה בקבוצות"), "groups");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        assert_eq!(map_category("טכנולוגיה"), "טכנולוגיה");
        assert_eq!(map_position("opening"), "opening");
    }

    #[test]
    fn test_remap_lesson() {
        let mut lesson = json!({
            "topic": "מערכת השמש",
            "category": "מדעים",
            "position": " פתיחת נושא ",
            "sections": {
                "opening": [{
                    "content": "...",
                    "spaceUsage": "מליאה",
                    "screen1": "סרטון",
                    "screen1Description": "סרטון על כוכבי הלכת"
                }],
                "main": [{ "spaceUsage": "משולב", "screen2": "פדלט", "screen3": "אחר" }]
            }
        });

        remap_lesson(&mut lesson);

        assert_eq!(lesson["category"], "science");
        assert_eq!(lesson["position"], "opening");
        assert_eq!(lesson["topic"], "מערכת השמש");
        assert_eq!(lesson["sections"]["opening"][0]["spaceUsage"], "whole");
        assert_eq!(lesson["sections"]["opening"][0]["screen1"], "video");
        assert_eq!(lesson["sections"]["opening"][0]["screen1Description"], "סרטון על כוכבי הלכת");
        assert_eq!(lesson["sections"]["main"][0]["spaceUsage"], "mixed");
        assert_eq!(lesson["sections"]["main"][0]["screen2"], "padlet");
        assert_eq!(lesson["sections"]["main"][0]["screen3"], "אחר");
    }

    #[test]
    fn test_remap_ignores_non_objects() {
        let mut v = json!(["פתיחת נושא"]);
        remap_lesson(&mut v);
        assert_eq!(v, json!(["פתיחת נושא"]));
    }
}
