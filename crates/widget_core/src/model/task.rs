use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_DUE_HOUR: i32 = 9;
pub const DEFAULT_DUE_MINUTE: i32 = 0;

/// Title shown when the selected task has no usable title of its own.
pub const NO_UPCOMING_TITLE: &str = "No upcoming tasks";

/// One to-do record as written by the main application.
///
/// Every field decodes leniently: a value of the wrong JSON type falls back to
/// the field default instead of failing the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_completed: bool,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<String>,
    #[serde(default = "default_due_hour", deserialize_with = "lenient_hour")]
    pub due_time_hour: i32,
    #[serde(default = "default_due_minute", deserialize_with = "lenient_minute")]
    pub due_time_minute: i32,
}

pub type TaskCollection = Vec<Task>;

impl Default for Task {
    fn default() -> Self {
        Self {
            title: None,
            is_completed: false,
            due_date: None,
            due_time_hour: DEFAULT_DUE_HOUR,
            due_time_minute: DEFAULT_DUE_MINUTE,
        }
    }
}

impl Task {
    pub fn is_pending(&self) -> bool {
        !self.is_completed
    }

    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => NO_UPCOMING_TITLE,
        }
    }

    /// `HH:MM` built from the display-time fields, not from `due_date`.
    pub fn display_time(&self) -> String {
        format!("{:02}:{:02}", self.due_time_hour, self.due_time_minute)
    }
}

fn default_due_hour() -> i32 {
    DEFAULT_DUE_HOUR
}

fn default_due_minute() -> i32 {
    DEFAULT_DUE_MINUTE
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn lenient_hour<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(int_or(Value::deserialize(deserializer)?, DEFAULT_DUE_HOUR))
}

fn lenient_minute<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(int_or(Value::deserialize(deserializer)?, DEFAULT_DUE_MINUTE))
}

fn int_or(value: Value, fallback: i32) -> i32 {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(number) if number.is_finite() => number.trunc() as i32,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DUE_HOUR, DEFAULT_DUE_MINUTE, NO_UPCOMING_TITLE, Task};
    use rstest::rstest;

    fn decode(json: serde_json::Value) -> Task {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn missing_fields_take_defaults() {
        let task = decode(serde_json::json!({}));

        assert_eq!(task, Task::default());
        assert_eq!(task.due_time_hour, DEFAULT_DUE_HOUR);
        assert_eq!(task.due_time_minute, DEFAULT_DUE_MINUTE);
        assert!(task.is_pending());
    }

    #[test]
    fn decodes_camel_case_record() {
        let task = decode(serde_json::json!({
            "title": "Buy milk",
            "isCompleted": true,
            "dueDate": "2025-12-21T09:00:00.000",
            "dueTimeHour": 14,
            "dueTimeMinute": 5
        }));

        assert_eq!(task.title.as_deref(), Some("Buy milk"));
        assert!(task.is_completed);
        assert_eq!(task.due_date.as_deref(), Some("2025-12-21T09:00:00.000"));
        assert_eq!(task.display_time(), "14:05");
    }

    #[rstest]
    #[case(serde_json::json!(true), true)]
    #[case(serde_json::json!(false), false)]
    #[case(serde_json::json!("TRUE"), true)]
    #[case(serde_json::json!("false"), false)]
    #[case(serde_json::json!("yes"), false)]
    #[case(serde_json::json!(1), false)]
    #[case(serde_json::json!(null), false)]
    fn is_completed_degrades_to_false(#[case] raw: serde_json::Value, #[case] expected: bool) {
        let task = decode(serde_json::json!({ "isCompleted": raw }));
        assert_eq!(task.is_completed, expected);
    }

    #[rstest]
    #[case(serde_json::json!(7), 7)]
    #[case(serde_json::json!(7.9), 7)]
    #[case(serde_json::json!("11"), 11)]
    #[case(serde_json::json!("noon"), DEFAULT_DUE_HOUR)]
    #[case(serde_json::json!(null), DEFAULT_DUE_HOUR)]
    #[case(serde_json::json!([1]), DEFAULT_DUE_HOUR)]
    fn due_time_hour_degrades_to_default(#[case] raw: serde_json::Value, #[case] expected: i32) {
        let task = decode(serde_json::json!({ "dueTimeHour": raw }));
        assert_eq!(task.due_time_hour, expected);
    }

    #[test]
    fn non_string_text_fields_are_stringified() {
        let task = decode(serde_json::json!({ "title": 42, "dueDate": null }));

        assert_eq!(task.title.as_deref(), Some("42"));
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn display_title_falls_back_when_blank() {
        let untitled = Task::default();
        let blank = Task {
            title: Some(String::new()),
            ..Task::default()
        };

        assert_eq!(untitled.display_title(), NO_UPCOMING_TITLE);
        assert_eq!(blank.display_title(), NO_UPCOMING_TITLE);
    }

    #[test]
    fn display_time_is_zero_padded() {
        let task = Task {
            due_time_hour: 7,
            due_time_minute: 3,
            ..Task::default()
        };

        assert_eq!(task.display_time(), "07:03");
    }
}
