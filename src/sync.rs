use tracing::{debug, warn};

use crate::error::Result;
use crate::mirror::{MirrorSnapshot, MirrorStore};
use crate::model::{DEFAULT_TASK_LIST, Task, TaskList};
use crate::sources::TaskService;

/// Keeps the local mirror in step with the remote service: fills it from bulk
/// listings and patches it after every successful write.
///
/// Mirror failures never reach the caller. The mirror is an optimisation, so a
/// failed write is logged and the next bulk listing repopulates it.
pub struct Synchronizer<'a> {
    service: &'a dyn TaskService,
    mirror: &'a MirrorStore,
}

impl<'a> Synchronizer<'a> {
    pub fn new(service: &'a dyn TaskService, mirror: &'a MirrorStore) -> Self {
        Self { service, mirror }
    }

    /// All task lists, from the mirror when it has any.
    pub fn task_lists(&self) -> Result<Vec<TaskList>> {
        if let Some(snapshot) = self.mirror.load()
            && !snapshot.task_lists.is_empty()
        {
            debug!(count = snapshot.task_lists.len(), "task lists from mirror");
            return Ok(snapshot.task_lists);
        }
        self.service.list_task_lists()
    }

    /// Display title for a list id. Lookup failures degrade: the default
    /// sentinel falls back to itself, any other id to an empty title.
    pub fn task_list_title(&self, list_id: &str) -> String {
        if let Some(snapshot) = self.mirror.load()
            && let Some(list) = snapshot.task_lists.iter().find(|l| l.id == list_id)
        {
            return list.title.clone();
        }

        match self.service.get_task_list(list_id) {
            Ok(list) => list.title,
            Err(e) if list_id == DEFAULT_TASK_LIST => {
                debug!(error = %e, "default list title unavailable");
                DEFAULT_TASK_LIST.to_string()
            }
            Err(e) => {
                warn!(list_id, error = %e, "failed to look up task list title");
                String::new()
            }
        }
    }

    /// Every open task in every list. A live, non-empty mirror is returned
    /// as-is; otherwise the whole set is fetched and a fresh snapshot saved.
    pub fn list_all_tasks(&self) -> Result<Vec<Task>> {
        if let Some(snapshot) = self.mirror.load()
            && !snapshot.tasks.is_empty()
        {
            debug!(count = snapshot.tasks.len(), "tasks from mirror");
            return Ok(snapshot.tasks);
        }

        let lists = self.task_lists()?;
        let mut tasks = Vec::new();
        for list in &lists {
            let open = self.service.list_tasks(&list.id, false, false)?;
            tasks.extend(open.into_iter().map(|t| t.with_list_title(&list.title)));
        }

        let mut snapshot = MirrorSnapshot::new(lists, tasks);
        best_effort("save", self.mirror.save(&mut snapshot));
        Ok(snapshot.tasks)
    }

    /// Open tasks in one list, always from the remote service.
    pub fn list_tasks(&self, list_id: &str) -> Result<Vec<Task>> {
        let title = self.task_list_title(list_id);
        let tasks = self.service.list_tasks(list_id, false, false)?;
        Ok(tasks
            .into_iter()
            .map(|t| t.with_list_title(&title))
            .collect())
    }

    pub fn after_create(&self, task: &Task) {
        if task.status.is_completed() {
            return;
        }
        best_effort("add", self.mirror.add_task(task));
    }

    pub fn after_update(&self, task: &Task) {
        if task.status.is_completed() {
            best_effort("remove", self.mirror.remove_task(&task.id));
        } else {
            best_effort("update", self.mirror.update_task(task));
        }
    }

    pub fn after_complete(&self, task_id: &str) {
        best_effort("remove", self.mirror.remove_task(task_id));
    }

    pub fn after_delete(&self, task_id: &str) {
        best_effort("remove", self.mirror.remove_task(task_id));
    }
}

fn best_effort(op: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!(op, error = %e, "mirror update skipped");
    }
}
