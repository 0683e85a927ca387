use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Task, TaskDraft, TaskList, TaskStatus, format_due, parse_due};

use super::TaskService;

pub const DEFAULT_API_URL: &str = "https://tasks.googleapis.com/tasks/v1";
const PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// Transport abstraction (for testability)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum HttpError {
    /// The service answered with a non-success status.
    Status(u16, String),
    /// The request never got an answer (DNS, TLS, connection, body read).
    Other(String),
}

pub trait HttpTransport {
    /// Send one request. An empty response body decodes to `Value::Null`.
    fn send(
        &self,
        method: &str,
        url: &Url,
        body: Option<&Value>,
    ) -> std::result::Result<Value, HttpError>;
}

struct UreqTransport {
    token: String,
}

impl HttpTransport for UreqTransport {
    fn send(
        &self,
        method: &str,
        url: &Url,
        body: Option<&Value>,
    ) -> std::result::Result<Value, HttpError> {
        let request = ureq::request(method, url.as_str())
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json");

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match result {
            Ok(response) => {
                let text = response
                    .into_string()
                    .map_err(|e| HttpError::Other(format!("failed to read response: {e}")))?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&text)
                    .map_err(|e| HttpError::Other(format!("failed to parse response: {e}")))
            }
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                Err(HttpError::Status(code, detail.trim().to_string()))
            }
            Err(e) => Err(HttpError::Other(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTaskList {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct WireTask {
    id: String,
    #[serde(default)]
    title: String,
    notes: Option<String>,
    due: Option<String>,
    #[serde(default)]
    status: TaskStatus,
}

impl From<WireTaskList> for TaskList {
    fn from(list: WireTaskList) -> Self {
        TaskList {
            id: list.id,
            title: list.title,
        }
    }
}

impl WireTask {
    fn into_task(self, list_id: &str) -> Task {
        Task {
            id: self.id,
            title: self.title,
            notes: self.notes.unwrap_or_default(),
            due: self.due.as_deref().and_then(parse_due),
            status: self.status,
            list_id: list_id.to_string(),
            list_title: String::new(),
        }
    }
}

fn insert_body(draft: &TaskDraft) -> Value {
    let mut body = serde_json::json!({
        "title": draft.title,
        "notes": draft.notes,
        "status": draft.status.as_str(),
    });
    if let Some(due) = draft.due {
        body["due"] = Value::String(format_due(due));
    }
    body
}

fn update_body(fields: &TaskDraft) -> Value {
    let mut body = serde_json::json!({
        "title": fields.title,
        "notes": fields.notes,
        "status": fields.status.as_str(),
        "due": fields.due.map(format_due),
    });
    // Reopening a task needs the completion timestamp cleared explicitly.
    if !fields.status.is_completed() {
        body["completed"] = Value::Null;
    }
    body
}

// ---------------------------------------------------------------------------
// GoogleTasksService
// ---------------------------------------------------------------------------

pub struct GoogleTasksService {
    base: Url,
    transport: Box<dyn HttpTransport>,
}

impl GoogleTasksService {
    pub fn new(config: &Config) -> Result<Self> {
        let token = auth::resolve_token(&config.token_env, config.token_path.as_deref())?;
        Self::with_transport(&config.api_url, Box::new(UreqTransport { token }))
    }

    pub fn with_transport(api_url: &str, transport: Box<dyn HttpTransport>) -> Result<Self> {
        let base = Url::parse(api_url)
            .map_err(|e| Error::ConfigValidation(format!("invalid api_url '{api_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(Error::ConfigValidation(format!(
                "invalid api_url '{api_url}': not a base URL"
            )));
        }
        Ok(Self { base, transport })
    }

    /// Append path segments to the base URL, percent-encoding each one so a
    /// user-typed id can never escape its segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: &str, url: &Url, body: Option<&Value>, what: &str) -> Result<Value> {
        debug!(method, path = url.path(), "tasks api request");
        self.transport
            .send(method, url, body)
            .map_err(|e| http_error(e, method, what))
    }

    fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|e| Error::Transport(format!("failed to parse {what}: {e}")))
    }

    /// Follow `nextPageToken` until the listing is exhausted.
    fn get_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(segments);
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("maxResults", PAGE_SIZE);
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }

            let page: Page<T> = Self::decode(self.request("GET", &url, None, what)?, what)?;
            items.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

fn http_error(err: HttpError, method: &str, what: &str) -> Error {
    match err {
        HttpError::Status(404, _) => Error::NotFound(what.to_string()),
        HttpError::Status(code, detail) => {
            Error::Transport(format!("failed to {method} {what}: HTTP {code}: {detail}"))
        }
        HttpError::Other(cause) => Error::Transport(format!("failed to {method} {what}: {cause}")),
    }
}

impl TaskService for GoogleTasksService {
    fn list_task_lists(&self) -> Result<Vec<TaskList>> {
        let lists: Vec<WireTaskList> =
            self.get_all(&["users", "@me", "lists"], &[], "task lists")?;
        debug!(count = lists.len(), "fetched task lists");
        Ok(lists.into_iter().map(TaskList::from).collect())
    }

    fn get_task_list(&self, list_id: &str) -> Result<TaskList> {
        let what = format!("task list '{list_id}'");
        let url = self.url(&["users", "@me", "lists", list_id]);
        let list: WireTaskList = Self::decode(self.request("GET", &url, None, &what)?, &what)?;
        Ok(list.into())
    }

    fn list_tasks(
        &self,
        list_id: &str,
        include_completed: bool,
        include_hidden: bool,
    ) -> Result<Vec<Task>> {
        let what = format!("tasks in list '{list_id}'");
        let completed = include_completed.to_string();
        let hidden = include_hidden.to_string();
        let tasks: Vec<WireTask> = self.get_all(
            &["lists", list_id, "tasks"],
            &[("showCompleted", &completed), ("showHidden", &hidden)],
            &what,
        )?;
        debug!(list_id, count = tasks.len(), "fetched tasks");
        Ok(tasks.into_iter().map(|t| t.into_task(list_id)).collect())
    }

    fn get_task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        let what = format!("task '{task_id}'");
        let url = self.url(&["lists", list_id, "tasks", task_id]);
        debug!(method = "GET", path = url.path(), "tasks api request");
        // The service rejects malformed ids with 400 rather than 404.
        let value = match self.transport.send("GET", &url, None) {
            Err(HttpError::Status(400, _)) => return Err(Error::NotFound(what)),
            result => result.map_err(|e| http_error(e, "GET", &what))?,
        };
        let task: WireTask = Self::decode(value, &what)?;
        Ok(task.into_task(list_id))
    }

    fn insert_task(&self, list_id: &str, draft: &TaskDraft) -> Result<Task> {
        let what = format!("task in list '{list_id}'");
        let url = self.url(&["lists", list_id, "tasks"]);
        let body = insert_body(draft);
        let task: WireTask =
            Self::decode(self.request("POST", &url, Some(&body), &what)?, &what)?;
        debug!(list_id, task_id = %task.id, "inserted task");
        Ok(task.into_task(list_id))
    }

    fn update_task(&self, list_id: &str, task_id: &str, fields: &TaskDraft) -> Result<Task> {
        let what = format!("task '{task_id}'");
        let url = self.url(&["lists", list_id, "tasks", task_id]);
        let body = update_body(fields);
        let task: WireTask =
            Self::decode(self.request("PATCH", &url, Some(&body), &what)?, &what)?;
        debug!(list_id, task_id, status = fields.status.as_str(), "updated task");
        Ok(task.into_task(list_id))
    }

    fn delete_task(&self, list_id: &str, task_id: &str) -> Result<()> {
        let what = format!("task '{task_id}'");
        let url = self.url(&["lists", list_id, "tasks", task_id]);
        self.request("DELETE", &url, None, &what)?;
        debug!(list_id, task_id, "deleted task");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
