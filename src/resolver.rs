use tracing::debug;

use crate::error::{Error, Result};
use crate::mirror::MirrorStore;
use crate::model::{DEFAULT_TASK_LIST, Task};
use crate::sources::TaskService;
use crate::sync::Synchronizer;

/// Turns user-typed list names and short task ids into canonical remote ids.
///
/// Single-list resolution is strict: a prefix shared by two tasks in the list
/// is an error. Cross-list lookup is first-match-wins: it skips lists where the
/// prefix is unknown or ambiguous and does not look at later lists once a
/// list yields a unique match. The mirror is consulted first in both
/// cases and returns its first prefix hit without an ambiguity check.
pub struct Resolver<'a> {
    service: &'a dyn TaskService,
    mirror: &'a MirrorStore,
}

impl<'a> Resolver<'a> {
    pub fn new(service: &'a dyn TaskService, mirror: &'a MirrorStore) -> Self {
        Self { service, mirror }
    }

    fn sync(&self) -> Synchronizer<'a> {
        Synchronizer::new(self.service, self.mirror)
    }

    /// Resolve a list title to its id. Empty names and the default sentinel
    /// resolve to the sentinel without a remote call.
    pub fn resolve_list_id(&self, name: &str) -> Result<String> {
        if name.is_empty() || name == DEFAULT_TASK_LIST {
            return Ok(DEFAULT_TASK_LIST.to_string());
        }

        self.sync()
            .task_lists()?
            .into_iter()
            .find(|list| list.title == name)
            .map(|list| list.id)
            .ok_or_else(|| Error::NotFound(format!("task list '{name}'")))
    }

    /// Resolve a full or partial task id within one list.
    ///
    /// Order: mirror prefix scan, direct fetch treating the input as a full
    /// id, then a prefix search over every task in the list (completed and
    /// hidden included).
    pub fn resolve_task_id(&self, list_id: &str, short: &str) -> Result<String> {
        if short.is_empty() {
            return Err(Error::NotFound("task ''".to_string()));
        }

        if let Some(snapshot) = self.mirror.load()
            && let Some(task) = snapshot
                .tasks
                .iter()
                .find(|t| t.list_id == list_id && t.id.starts_with(short))
        {
            debug!(short, id = %task.id, "task id from mirror");
            return Ok(task.id.clone());
        }

        match self.service.get_task(list_id, short) {
            Ok(task) => return Ok(task.id),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let mut matches: Vec<String> = self
            .service
            .list_tasks(list_id, true, true)?
            .into_iter()
            .filter(|t| t.id.starts_with(short))
            .map(|t| t.id)
            .collect();

        if matches.len() > 1 {
            return Err(Error::AmbiguousId {
                prefix: short.to_string(),
                scope: list_id.to_string(),
                matches,
            });
        }
        matches
            .pop()
            .ok_or_else(|| Error::NotFound(format!("task '{short}'")))
    }

    /// Resolve and fetch a task within one list, with its list title filled.
    pub fn get_task(&self, list_id: &str, short: &str) -> Result<Task> {
        let full_id = self.resolve_task_id(list_id, short)?;
        let task = self.service.get_task(list_id, &full_id)?;
        Ok(task.with_list_title(&self.sync().task_list_title(list_id)))
    }

    /// Find a task by full or partial id without knowing its list. Returns
    /// the first unique hit in list order. Lists where the id is unknown or
    /// ambiguous are skipped; transport failures stop the search.
    pub fn find_task_across_lists(&self, short: &str) -> Result<Task> {
        if short.is_empty() {
            return Err(Error::NotFound("task ''".to_string()));
        }

        if let Some(snapshot) = self.mirror.load()
            && let Some(task) = snapshot
                .tasks
                .into_iter()
                .find(|t| t.id == short || t.id.starts_with(short))
        {
            debug!(short, id = %task.id, "task from mirror");
            return Ok(task);
        }

        for list in self.sync().task_lists()? {
            match self.get_task(&list.id, short) {
                Ok(task) => return Ok(task),
                Err(e) if e.is_not_found() => {
                    debug!(short, list_id = %list.id, "task not in list");
                }
                Err(e @ Error::AmbiguousId { .. }) => {
                    debug!(short, list_id = %list.id, error = %e, "skipping list");
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::NotFound(format!("task '{short}'")))
    }
}
