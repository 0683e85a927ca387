use crate::model::{Task, TaskList, TaskStatus};

/// Create an open `Task` with empty notes and no due date.
pub fn make_task(id: &str, title: &str, list_id: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        notes: String::new(),
        due: None,
        status: TaskStatus::NeedsAction,
        list_id: list_id.to_string(),
        list_title: String::new(),
    }
}

pub fn make_list(id: &str, title: &str) -> TaskList {
    TaskList {
        id: id.to_string(),
        title: title.to_string(),
    }
}
