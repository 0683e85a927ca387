use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved list id meaning "the user's default list".
pub const DEFAULT_TASK_LIST: &str = "@default";

const SHORT_ID_LEN: usize = 8;
const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    NeedsAction,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NeedsAction => "needsAction",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "needsAction" | "needs-action" | "open" => Ok(TaskStatus::NeedsAction),
            "completed" | "done" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "unknown status: {other} (expected: needsAction, completed)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub status: TaskStatus,
    pub list_id: String,
    /// Denormalised for display; may be empty straight off the wire.
    #[serde(default)]
    pub list_title: String,
}

impl Task {
    pub fn with_list_title(mut self, title: &str) -> Self {
        self.list_title = title.to_string();
        self
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// The editable fields sent on insert and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub due: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            status: task.status,
        }
    }
}

/// First eight characters of a canonical id, or the whole id if shorter.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Pad a date to the remote timestamp form, e.g. `2024-03-01T00:00:00.000Z`.
pub fn format_due(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format(DUE_DATE_FORMAT))
}

/// Truncate a remote timestamp to its date part. Anything shorter than a
/// date, or not starting with one, is treated as "no due date".
pub fn parse_due(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10)?;
    NaiveDate::parse_from_str(date, DUE_DATE_FORMAT).ok()
}

/// Parse a user-typed `YYYY-MM-DD` date.
pub fn parse_due_input(input: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), DUE_DATE_FORMAT)
        .map_err(|e| format!("invalid date '{input}' (expected YYYY-MM-DD): {e}"))
}
