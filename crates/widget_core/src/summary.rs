//! Derivation of the widget status summary from a task snapshot.
//!
//! Everything here is pure: the caller hands in the decoded collection (or the
//! raw blob) together with the current wall-clock time and gets back one of
//! three terminal outcomes, empty, error or ready.

use crate::error::AppError;
use crate::model::{NO_UPCOMING_TITLE, Task, TaskCollection};
use serde::Serialize;
use serde_json::{Map, Value};
use time::PrimitiveDateTime;
use time::macros::format_description;

/// Only `YYYY-MM-DDTHH:mm:ss` is significant in a stored due date.
const DUE_DATE_LEN: usize = 19;

pub const EMPTY_TITLE: &str = "No tasks";
pub const EMPTY_DETAIL: &str = "Add a task to get started";
pub const CAUGHT_UP_DETAIL: &str = "All caught up!";
pub const ERROR_COUNT_LINE: &str = "Error loading tasks";
pub const ERROR_TITLE: &str = "Please open the app";
pub const ERROR_DETAIL: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryState {
    Empty,
    Error,
    Ready,
}

/// The three text slots of the display surface, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLines {
    pub pending_count: String,
    pub task_title: String,
    pub task_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub state: SummaryState,
    pub pending_count: usize,
    pub next_task: Option<Task>,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            state: SummaryState::Empty,
            pending_count: 0,
            next_task: None,
        }
    }

    pub fn error() -> Self {
        Self {
            state: SummaryState::Error,
            pending_count: 0,
            next_task: None,
        }
    }

    pub fn lines(&self) -> DisplayLines {
        match self.state {
            SummaryState::Empty => DisplayLines {
                pending_count: pending_line(0),
                task_title: EMPTY_TITLE.to_string(),
                task_time: EMPTY_DETAIL.to_string(),
            },
            SummaryState::Error => DisplayLines {
                pending_count: ERROR_COUNT_LINE.to_string(),
                task_title: ERROR_TITLE.to_string(),
                task_time: ERROR_DETAIL.to_string(),
            },
            SummaryState::Ready => match self.next_task.as_ref() {
                Some(task) => DisplayLines {
                    pending_count: pending_line(self.pending_count),
                    task_title: task.display_title().to_string(),
                    task_time: format!("Next: {}", task.display_time()),
                },
                None => DisplayLines {
                    pending_count: pending_line(self.pending_count),
                    task_title: NO_UPCOMING_TITLE.to_string(),
                    task_time: CAUGHT_UP_DETAIL.to_string(),
                },
            },
        }
    }
}

fn pending_line(count: usize) -> String {
    format!("{count} pending tasks")
}

/// Count pending tasks and pick the earliest strictly-future one.
///
/// Ties on the due time keep the task encountered first. Tasks whose due date
/// cannot be parsed still count as pending but are never selected.
pub fn compute(tasks: &[Task], now: PrimitiveDateTime) -> Summary {
    if tasks.is_empty() {
        return Summary::empty();
    }

    let mut pending_count = 0;
    let mut best: Option<(PrimitiveDateTime, &Task)> = None;

    for task in tasks.iter().filter(|task| task.is_pending()) {
        pending_count += 1;

        let raw = match task.due_date.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };

        let Some(due) = parse_due_date(raw) else {
            tracing::debug!(due_date = raw, "skipping task with unparseable due date");
            continue;
        };

        let earlier = best.is_none_or(|(best_due, _)| due < best_due);
        if due > now && earlier {
            best = Some((due, task));
        }
    }

    Summary {
        state: SummaryState::Ready,
        pending_count,
        next_task: best.map(|(_, task)| task.clone()),
    }
}

/// Parse the significant prefix of a stored due date. Fractional seconds and
/// zone suffixes are ignored and no offset is applied.
pub fn parse_due_date(raw: &str) -> Option<PrimitiveDateTime> {
    let head = raw.get(..DUE_DATE_LEN)?;
    PrimitiveDateTime::parse(
        head,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .ok()
}

/// Decode a serialized collection. The blob must be a JSON array whose
/// elements are all objects; individual fields are decoded leniently.
pub fn decode_tasks(blob: &str) -> Result<TaskCollection, AppError> {
    let records: Vec<Map<String, Value>> =
        serde_json::from_str(blob).map_err(|err| AppError::invalid_data(err.to_string()))?;

    records
        .into_iter()
        .map(|record| {
            serde_json::from_value(Value::Object(record))
                .map_err(|err| AppError::invalid_data(err.to_string()))
        })
        .collect()
}

/// Decode `blob` and compute its summary. An absent or zero-length blob is the
/// empty state; a blob that does not decode is the error state.
pub fn summarize_blob(blob: Option<&str>, now: PrimitiveDateTime) -> Summary {
    let blob = match blob {
        Some(value) if !value.is_empty() => value,
        _ => return Summary::empty(),
    };

    match decode_tasks(blob) {
        Ok(tasks) => compute(&tasks, now),
        Err(err) => {
            tracing::warn!(error = %err, "task collection could not be decoded");
            Summary::error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CAUGHT_UP_DETAIL, DisplayLines, EMPTY_DETAIL, EMPTY_TITLE, ERROR_COUNT_LINE, ERROR_TITLE,
        Summary, SummaryState, compute, decode_tasks, parse_due_date, summarize_blob,
    };
    use crate::model::Task;
    use time::PrimitiveDateTime;
    use time::macros::datetime;

    const NOW: PrimitiveDateTime = datetime!(2030-01-01 00:00:00);

    fn pending(title: &str, due_date: Option<&str>) -> Task {
        Task {
            title: Some(title.to_string()),
            due_date: due_date.map(str::to_string),
            ..Task::default()
        }
    }

    fn completed(title: &str, due_date: Option<&str>) -> Task {
        Task {
            is_completed: true,
            ..pending(title, due_date)
        }
    }

    fn next_title(summary: &Summary) -> Option<&str> {
        summary
            .next_task
            .as_ref()
            .and_then(|task| task.title.as_deref())
    }

    #[test]
    fn empty_collection_is_empty_state() {
        let summary = compute(&[], NOW);

        assert_eq!(summary, Summary::empty());
        assert_eq!(
            summary.lines(),
            DisplayLines {
                pending_count: "0 pending tasks".to_string(),
                task_title: EMPTY_TITLE.to_string(),
                task_time: EMPTY_DETAIL.to_string(),
            }
        );
    }

    #[test]
    fn absent_or_zero_length_blob_is_empty_state() {
        assert_eq!(summarize_blob(None, NOW), Summary::empty());
        assert_eq!(summarize_blob(Some(""), NOW), Summary::empty());
        assert_eq!(
            summarize_blob(Some("[]"), datetime!(1970-01-01 00:00:00)),
            Summary::empty()
        );
    }

    #[test]
    fn malformed_blob_is_error_state() {
        for blob in ["{not json", "{\"title\":\"A\"}", "[1, 2]", "[{}, \"x\"]", "   "] {
            let summary = summarize_blob(Some(blob), NOW);
            assert_eq!(summary.state, SummaryState::Error, "blob: {blob}");

            let lines = summary.lines();
            assert_eq!(lines.pending_count, ERROR_COUNT_LINE);
            assert_eq!(lines.task_title, ERROR_TITLE);
            assert_eq!(lines.task_time, "");
        }
    }

    #[test]
    fn error_state_differs_from_empty_state() {
        assert_ne!(Summary::error().lines(), Summary::empty().lines());
    }

    #[test]
    fn earliest_future_due_date_wins() {
        let tasks = vec![
            pending("A", Some("2099-01-01T00:00:00")),
            pending("B", Some("2050-01-01T00:00:00")),
        ];

        let summary = compute(&tasks, NOW);

        assert_eq!(summary.pending_count, 2);
        assert_eq!(next_title(&summary), Some("B"));
        assert_eq!(summary.lines().task_time, "Next: 09:00");
    }

    #[test]
    fn ties_keep_first_encountered_task() {
        let tasks = vec![
            pending("first", Some("2040-05-05T10:00:00")),
            pending("second", Some("2040-05-05T10:00:00.999Z")),
        ];

        let summary = compute(&tasks, NOW);

        assert_eq!(next_title(&summary), Some("first"));
    }

    #[test]
    fn completed_tasks_are_never_selected() {
        let tasks = vec![
            completed("done", Some("2031-01-01T00:00:00")),
            pending("later", Some("2040-01-01T00:00:00")),
        ];

        let summary = compute(&tasks, NOW);

        assert_eq!(summary.pending_count, 1);
        assert_eq!(next_title(&summary), Some("later"));
    }

    #[test]
    fn due_at_or_before_now_is_not_upcoming() {
        let tasks = vec![
            pending("past", Some("2029-12-31T23:59:59")),
            pending("exactly now", Some("2030-01-01T00:00:00")),
        ];

        let summary = compute(&tasks, NOW);

        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.next_task, None);
        let lines = summary.lines();
        assert_eq!(lines.pending_count, "2 pending tasks");
        assert_eq!(lines.task_title, "No upcoming tasks");
        assert_eq!(lines.task_time, CAUGHT_UP_DETAIL);
    }

    #[test]
    fn only_completed_task_is_caught_up() {
        let summary = compute(&[completed("done", None)], NOW);

        assert_eq!(summary.state, SummaryState::Ready);
        assert_eq!(summary.pending_count, 0);
        assert_eq!(
            summary.lines(),
            DisplayLines {
                pending_count: "0 pending tasks".to_string(),
                task_title: "No upcoming tasks".to_string(),
                task_time: "All caught up!".to_string(),
            }
        );
    }

    #[test]
    fn invalid_due_dates_still_count_as_pending() {
        let tasks = vec![
            pending("short", Some("2040-01-01")),
            pending("garbage", Some("next tuesday at noon")),
            pending("empty", Some("")),
            pending("none", None),
        ];

        let summary = compute(&tasks, NOW);

        assert_eq!(summary.pending_count, 4);
        assert_eq!(summary.next_task, None);
    }

    #[test]
    fn untitled_next_task_uses_fallback_title_and_display_time() {
        let task = Task {
            due_date: Some("2031-06-01T18:30:00".to_string()),
            due_time_hour: 7,
            due_time_minute: 5,
            ..Task::default()
        };

        let lines = compute(&[task], NOW).lines();

        assert_eq!(lines.pending_count, "1 pending tasks");
        assert_eq!(lines.task_title, "No upcoming tasks");
        assert_eq!(lines.task_time, "Next: 07:05");
    }

    #[test]
    fn parse_due_date_ignores_suffix() {
        assert_eq!(
            parse_due_date("2025-12-21T09:15:30.123456+02:00"),
            Some(datetime!(2025-12-21 09:15:30))
        );
        assert_eq!(parse_due_date("2025-12-21T09:15"), None);
        assert_eq!(parse_due_date("2025-13-21T09:15:30"), None);
    }

    #[test]
    fn decode_rejects_non_object_elements() {
        let err = decode_tasks("[{\"title\":\"A\"}, 3]").unwrap_err();
        assert_eq!(err.code(), "invalid_data");
    }

    #[test]
    fn serialize_then_decode_yields_identical_summary() {
        let tasks = vec![
            pending("A", Some("2099-01-01T00:00:00")),
            completed("B", Some("2031-01-01T00:00:00")),
            Task {
                due_date: Some("2045-03-03T03:03:03".to_string()),
                due_time_hour: 21,
                ..Task::default()
            },
        ];

        let blob = serde_json::to_string(&tasks).unwrap();
        let decoded = decode_tasks(&blob).unwrap();
        assert_eq!(decoded, tasks);

        let first = summarize_blob(Some(&blob), NOW);
        let second = summarize_blob(Some(&blob), NOW);
        assert_eq!(first, second);
        assert_eq!(first, compute(&tasks, NOW));
        assert_eq!(first.lines().task_time, "Next: 21:00");
    }
}
