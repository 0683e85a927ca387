#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use gt::client::TaskClient;
use gt::error::{Error, Result};
use gt::mirror::MirrorStore;
use gt::model::{DEFAULT_TASK_LIST, Task, TaskDraft, TaskList, TaskStatus};
use gt::sources::TaskService;

#[derive(Default)]
struct FakeState {
    lists: Vec<TaskList>,
    tasks: Vec<Task>,
    calls: HashMap<&'static str, usize>,
    next_id: usize,
    fail_with: Option<String>,
    failing_methods: HashMap<&'static str, String>,
}

/// In-memory task service. Clones share state, so a test can keep a handle
/// after boxing one into a `TaskClient`.
#[derive(Clone, Default)]
pub struct FakeService {
    state: Rc<RefCell<FakeState>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, id: &str, title: &str) -> Self {
        self.state.borrow_mut().lists.push(TaskList {
            id: id.to_string(),
            title: title.to_string(),
        });
        self
    }

    pub fn with_task(self, list_id: &str, id: &str, title: &str) -> Self {
        self.state.borrow_mut().tasks.push(open_task(id, title, list_id));
        self
    }

    pub fn with_completed_task(self, list_id: &str, id: &str, title: &str) -> Self {
        let mut task = open_task(id, title, list_id);
        task.status = TaskStatus::Completed;
        self.state.borrow_mut().tasks.push(task);
        self
    }

    /// Make every subsequent call fail with a transport error.
    pub fn fail_all(&self, message: &str) {
        self.state.borrow_mut().fail_with = Some(message.to_string());
    }

    /// Make every subsequent call to one method fail with a transport error.
    pub fn fail_method(&self, method: &'static str, message: &str) {
        self.state
            .borrow_mut()
            .failing_methods
            .insert(method, message.to_string());
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state.borrow().calls.get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn task(&self, id: &str) -> Option<Task> {
        self.state.borrow().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn task_count(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    fn record(&self, method: &'static str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(method).or_default() += 1;
        match state.fail_with.as_ref().or(state.failing_methods.get(method)) {
            Some(message) => Err(Error::Transport(message.clone())),
            None => Ok(()),
        }
    }

    /// The sentinel stands for the first list, as the real service does.
    fn real_list_id(&self, list_id: &str) -> Result<String> {
        let state = self.state.borrow();
        let list = if list_id == DEFAULT_TASK_LIST {
            state.lists.first()
        } else {
            state.lists.iter().find(|l| l.id == list_id)
        };
        list.map(|l| l.id.clone())
            .ok_or_else(|| Error::NotFound(format!("task list '{list_id}'")))
    }
}

impl TaskService for FakeService {
    fn list_task_lists(&self) -> Result<Vec<TaskList>> {
        self.record("list_task_lists")?;
        Ok(self.state.borrow().lists.clone())
    }

    fn get_task_list(&self, list_id: &str) -> Result<TaskList> {
        self.record("get_task_list")?;
        let id = self.real_list_id(list_id)?;
        let state = self.state.borrow();
        state
            .lists
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task list '{list_id}'")))
    }

    fn list_tasks(
        &self,
        list_id: &str,
        include_completed: bool,
        _include_hidden: bool,
    ) -> Result<Vec<Task>> {
        self.record("list_tasks")?;
        let id = self.real_list_id(list_id)?;
        Ok(self
            .state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.list_id == id)
            .filter(|t| include_completed || !t.status.is_completed())
            .cloned()
            .collect())
    }

    fn get_task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        self.record("get_task")?;
        let id = self.real_list_id(list_id)?;
        self.state
            .borrow()
            .tasks
            .iter()
            .find(|t| t.list_id == id && t.id == task_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task '{task_id}'")))
    }

    fn insert_task(&self, list_id: &str, draft: &TaskDraft) -> Result<Task> {
        self.record("insert_task")?;
        let id = self.real_list_id(list_id)?;
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let task = Task {
            id: format!("new{:013}", state.next_id),
            title: draft.title.clone(),
            notes: draft.notes.clone(),
            due: draft.due,
            status: draft.status,
            list_id: id,
            list_title: String::new(),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    fn update_task(&self, list_id: &str, task_id: &str, fields: &TaskDraft) -> Result<Task> {
        self.record("update_task")?;
        let id = self.real_list_id(list_id)?;
        let mut state = self.state.borrow_mut();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.list_id == id && t.id == task_id)
            .ok_or_else(|| Error::NotFound(format!("task '{task_id}'")))?;
        task.title = fields.title.clone();
        task.notes = fields.notes.clone();
        task.due = fields.due;
        task.status = fields.status;
        Ok(task.clone())
    }

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()> {
        self.record("delete_task")?;
        let id = self.real_list_id(list_id)?;
        let mut state = self.state.borrow_mut();
        let before = state.tasks.len();
        state.tasks.retain(|t| !(t.list_id == id && t.id == task_id));
        if state.tasks.len() == before {
            return Err(Error::NotFound(format!("task '{task_id}'")));
        }
        Ok(())
    }
}

pub fn open_task(id: &str, title: &str, list_id: &str) -> Task {
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

pub fn mirror_in(dir: &Path) -> MirrorStore {
    MirrorStore::new(dir, Duration::from_secs(300))
}

pub fn client(service: &FakeService, dir: &Path) -> TaskClient {
    TaskClient::new(Box::new(service.clone()), mirror_in(dir))
}
