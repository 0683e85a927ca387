pub mod google;

use crate::error::Result;
use crate::model::{Task, TaskDraft, TaskList};

/// Request/response contract of the remote task service.
///
/// Tasks returned from here carry `list_id` but an empty `list_title`; the
/// synchronizer fills in the denormalised title.
pub trait TaskService {
    /// Every task list the user owns, in service order.
    fn list_task_lists(&self) -> Result<Vec<TaskList>>;

    /// A single list. Must accept the default-list sentinel.
    fn get_task_list(&self, list_id: &str) -> Result<TaskList>;

    fn list_tasks(
        &self,
        list_id: &str,
        include_completed: bool,
        include_hidden: bool,
    ) -> Result<Vec<Task>>;

    /// Fetch one task by its full id. Fails with `Error::NotFound` when the
    /// service has no such task, and `Error::Transport` for anything else.
    fn get_task(&self, list_id: &str, task_id: &str) -> Result<Task>;

    fn insert_task(&self, list_id: &str, draft: &TaskDraft) -> Result<Task>;

    /// Overwrite the editable fields of an existing task.
    fn update_task(&self, list_id: &str, task_id: &str, fields: &TaskDraft) -> Result<Task>;

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()>;
}
