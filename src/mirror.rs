use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Task, TaskList};

/// Snapshots older than this are never handed to readers.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const MIRROR_FILE: &str = "cache.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MirrorSnapshot {
    #[serde(default)]
    pub task_lists: Vec<TaskList>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub captured_at: DateTime<Utc>,
}

impl MirrorSnapshot {
    pub fn new(task_lists: Vec<TaskList>, tasks: Vec<Task>) -> Self {
        Self {
            task_lists,
            tasks,
            captured_at: Utc::now(),
        }
    }
}

/// Time-bounded on-disk copy of task lists and open tasks, persisted as a
/// single JSON document under the user's cache directory.
///
/// Every operation is best-effort from the reader's point of view: a missing,
/// corrupt or expired document is simply "no mirror". Patch operations on an
/// absent mirror do nothing; only a bulk listing creates a new one.
#[derive(Debug, Clone)]
pub struct MirrorStore {
    path: Option<PathBuf>,
    ttl: Duration,
}

impl MirrorStore {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: Some(dir.into().join(MIRROR_FILE)),
            ttl,
        }
    }

    /// A store with no backing file: always absent, writes are dropped.
    pub fn disabled() -> Self {
        Self {
            path: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// Default mirror directory, `<user cache dir>/gt`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("gt"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the live snapshot, if any.
    pub fn load(&self) -> Option<MirrorSnapshot> {
        self.load_at(Utc::now())
    }

    /// Load the snapshot as seen at `now`. Corrupt and expired documents are
    /// both reported as absent.
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<MirrorSnapshot> {
        let path = self.path.as_ref()?;

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read mirror {}: {e}, ignoring", path.display());
                return None;
            }
        };

        let snapshot: MirrorSnapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("corrupted mirror {}: {e}, ignoring", path.display());
                return None;
            }
        };

        // A capture time in the future (clock skew) counts as fresh.
        let expired = (now - snapshot.captured_at)
            .to_std()
            .is_ok_and(|age| age > self.ttl);
        if expired {
            debug!(captured_at = %snapshot.captured_at, "mirror expired");
            return None;
        }

        Some(snapshot)
    }

    /// Stamp `captured_at` with the current time and replace the persisted
    /// document atomically.
    pub fn save(&self, snapshot: &mut MirrorSnapshot) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };

        snapshot.captured_at = Utc::now();
        let content = serde_json::to_vec(snapshot)
            .map_err(|e| Error::Persistence(format!("failed to serialize mirror: {e}")))?;

        write_atomic(path, &content)?;
        debug!(
            lists = snapshot.task_lists.len(),
            tasks = snapshot.tasks.len(),
            "mirror saved"
        );
        Ok(())
    }

    /// Append a task to a live mirror.
    pub fn add_task(&self, task: &Task) -> Result<()> {
        self.patch(|snapshot| {
            snapshot.tasks.push(task.clone());
            true
        })
    }

    /// Replace the task with the same id in a live mirror.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        self.patch(|snapshot| {
            match snapshot.tasks.iter_mut().find(|t| t.id == task.id) {
                Some(slot) => {
                    *slot = task.clone();
                    true
                }
                None => false,
            }
        })
    }

    /// Drop the task with this id from a live mirror.
    pub fn remove_task(&self, task_id: &str) -> Result<()> {
        self.patch(|snapshot| {
            match snapshot.tasks.iter().position(|t| t.id == task_id) {
                Some(index) => {
                    snapshot.tasks.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Delete the persisted document. Already absent is fine.
    pub fn invalidate(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Persistence(format!(
                "failed to remove mirror {}: {e}",
                path.display()
            ))),
        }
    }

    /// Read-modify-write over the whole snapshot. `mutate` returns whether
    /// anything changed; unchanged snapshots are not rewritten.
    fn patch(&self, mutate: impl FnOnce(&mut MirrorSnapshot) -> bool) -> Result<()> {
        let Some(mut snapshot) = self.load() else {
            return Ok(());
        };
        if mutate(&mut snapshot) {
            self.save(&mut snapshot)?;
        }
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Persistence(format!("invalid mirror path {}", path.display())))?;
    create_private_dir(dir)
        .map_err(|e| Error::Persistence(format!("failed to create {}: {e}", dir.display())))?;

    // Temp files are created owner-only (0600), which carries over on persist.
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::Persistence(format!("failed to create temp file: {e}")))?;
    temp.write_all(data)
        .map_err(|e| Error::Persistence(format!("failed to write mirror: {e}")))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::Persistence(format!("failed to flush mirror: {e}")))?;
    temp.persist(path).map_err(|e| {
        Error::Persistence(format!("failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}
