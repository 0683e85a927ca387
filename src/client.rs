use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::mirror::MirrorStore;
use crate::model::{Task, TaskDraft, TaskList, TaskStatus};
use crate::resolver::Resolver;
use crate::sources::TaskService;
use crate::sources::google::GoogleTasksService;
use crate::sync::Synchronizer;

/// One remote service and one mirror for the lifetime of a command. Every
/// write goes to the service first and is then patched into the mirror.
pub struct TaskClient {
    service: Box<dyn TaskService>,
    mirror: MirrorStore,
}

impl TaskClient {
    pub fn new(service: Box<dyn TaskService>, mirror: MirrorStore) -> Self {
        Self { service, mirror }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let service = GoogleTasksService::new(config)?;
        Ok(Self::new(Box::new(service), config.mirror_store()))
    }

    pub fn mirror(&self) -> &MirrorStore {
        &self.mirror
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.service.as_ref(), &self.mirror)
    }

    pub fn sync(&self) -> Synchronizer<'_> {
        Synchronizer::new(self.service.as_ref(), &self.mirror)
    }

    // --- reads ---

    pub fn task_lists(&self) -> Result<Vec<TaskList>> {
        self.sync().task_lists()
    }

    pub fn resolve_list_id(&self, name: &str) -> Result<String> {
        self.resolver().resolve_list_id(name)
    }

    pub fn resolve_task_id(&self, list_id: &str, short: &str) -> Result<String> {
        self.resolver().resolve_task_id(list_id, short)
    }

    pub fn get_task(&self, list_id: &str, short: &str) -> Result<Task> {
        self.resolver().get_task(list_id, short)
    }

    pub fn find_task(&self, short: &str) -> Result<Task> {
        self.resolver().find_task_across_lists(short)
    }

    pub fn list_all_tasks(&self) -> Result<Vec<Task>> {
        self.sync().list_all_tasks()
    }

    pub fn list_tasks(&self, list_id: &str) -> Result<Vec<Task>> {
        self.sync().list_tasks(list_id)
    }

    // --- writes ---

    pub fn create_task(&self, list_id: &str, draft: &TaskDraft) -> Result<Task> {
        let sync = self.sync();
        let created = self
            .service
            .insert_task(list_id, draft)?
            .with_list_title(&sync.task_list_title(list_id));
        sync.after_create(&created);
        info!(id = %created.id, list_id, "task created");
        Ok(created)
    }

    pub fn update_task(&self, list_id: &str, short: &str, fields: &TaskDraft) -> Result<Task> {
        let full_id = self.resolve_task_id(list_id, short)?;
        let sync = self.sync();
        let updated = self
            .service
            .update_task(list_id, &full_id, fields)?
            .with_list_title(&sync.task_list_title(list_id));
        sync.after_update(&updated);
        info!(id = %updated.id, list_id, "task updated");
        Ok(updated)
    }

    /// Mark a task completed, keeping its other fields as the service has them.
    pub fn complete_task(&self, list_id: &str, short: &str) -> Result<Task> {
        let full_id = self.resolve_task_id(list_id, short)?;
        let existing = self.service.get_task(list_id, &full_id)?;
        let fields = TaskDraft {
            status: TaskStatus::Completed,
            ..TaskDraft::from(&existing)
        };

        let sync = self.sync();
        let completed = self.service.update_task(list_id, &full_id, &fields)?;
        sync.after_complete(&full_id);
        info!(id = %full_id, list_id, "task completed");
        Ok(completed.with_list_title(&sync.task_list_title(list_id)))
    }

    /// Delete a task; returns its canonical id.
    pub fn delete_task(&self, list_id: &str, short: &str) -> Result<String> {
        let full_id = self.resolve_task_id(list_id, short)?;
        self.service.delete_task(list_id, &full_id)?;
        self.sync().after_delete(&full_id);
        info!(id = %full_id, list_id, "task deleted");
        Ok(full_id)
    }

    /// Move a task to another list. The service has no move, so the task is
    /// re-created in the target list (under a new id) before the original is
    /// deleted.
    pub fn move_task(&self, task: &Task, to_list_id: &str, fields: &TaskDraft) -> Result<Task> {
        let created = self.create_task(to_list_id, fields)?;
        self.service.delete_task(&task.list_id, &task.id)?;
        self.sync().after_delete(&task.id);
        info!(from = %task.id, to = %created.id, to_list_id, "task moved");
        Ok(created)
    }
}
