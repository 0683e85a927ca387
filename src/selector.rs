use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Task;

const DEFAULT_BINARY: &str = "fzf";

/// Interactive choice of one task, used when a command is given no task id.
pub trait TaskSelector {
    /// Index into `tasks` of the task the user picked.
    fn select(&self, tasks: &[Task]) -> Result<usize>;
}

/// Picks a task through `fzf`. Each line fed to fzf is `index<TAB>[LIST] TITLE`
/// and only the second field is shown.
pub struct FzfSelector {
    binary: String,
}

impl Default for FzfSelector {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl FzfSelector {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl TaskSelector for FzfSelector {
    fn select(&self, tasks: &[Task]) -> Result<usize> {
        if tasks.is_empty() {
            return Err(Error::Selection("no tasks found".to_string()));
        }

        let mut child = Command::new(&self.binary)
            .args(["--delimiter=\t", "--with-nth=2"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    Error::Selection(format!("{} is not installed", self.binary))
                }
                _ => Error::Selection(format!("failed to run {}: {e}", self.binary)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(selector_input(tasks).as_bytes())?;
        }
        let output = child.wait_with_output()?;
        debug!(status = ?output.status, "selector exited");

        // fzf exits 1 when nothing matched and 130 on Esc/Ctrl-C.
        match output.status.code() {
            Some(0) => parse_selection(&String::from_utf8_lossy(&output.stdout), tasks.len()),
            Some(1) | Some(130) | None => Err(Error::Selection("cancelled".to_string())),
            Some(code) => Err(Error::Selection(format!(
                "{} exited with status {code}",
                self.binary
            ))),
        }
    }
}

fn selector_input(tasks: &[Task]) -> String {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{i}\t[{}] {}\n", one_line(&t.list_title), one_line(&t.title)))
        .collect()
}

/// Tabs and newlines would break fzf's field and line splitting.
fn one_line(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

fn parse_selection(output: &str, count: usize) -> Result<usize> {
    let selected = output.trim();
    if selected.is_empty() {
        return Err(Error::Selection("cancelled".to_string()));
    }
    let index: usize = selected
        .split('\t')
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| Error::Selection(format!("failed to parse selection '{selected}'")))?;
    if index >= count {
        return Err(Error::Selection("invalid selection".to_string()));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_task;
    use tempfile::TempDir;

    fn tasks() -> Vec<Task> {
        vec![
            make_task("aaaa1111", "Buy milk", "L1").with_list_title("Home"),
            make_task("bbbb2222", "Write\treport", "L2").with_list_title("Work"),
        ]
    }

    #[test]
    fn test_selector_input_lines() {
        assert_eq!(
            selector_input(&tasks()),
            "0\t[Home] Buy milk\n1\t[Work] Write report\n"
        );
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1\t[Work] Write report\n", 2).unwrap(), 1);
        assert!(matches!(
            parse_selection("\n", 2),
            Err(Error::Selection(msg)) if msg == "cancelled"
        ));
        assert!(parse_selection("7\t[Work] x", 2).is_err());
        assert!(parse_selection("x\ty", 2).is_err());
    }

    #[test]
    fn test_empty_task_list() {
        let err = FzfSelector::default().select(&[]).unwrap_err();
        assert_eq!(err.to_string(), "no tasks found");
    }

    #[test]
    fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no-such-fzf");
        let err = FzfSelector::new(missing.to_str().unwrap())
            .select(&tasks())
            .unwrap_err();
        assert!(err.to_string().contains("is not installed"));
    }

    #[cfg(unix)]
    fn script(dir: &TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-fzf");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[cfg(unix)]
    #[test]
    fn test_select_reads_chosen_line() {
        let dir = TempDir::new().unwrap();
        let selector = FzfSelector::new(script(&dir, "grep '^1'"));
        assert_eq!(selector.select(&tasks()).unwrap(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_select_cancelled() {
        let dir = TempDir::new().unwrap();
        let selector = FzfSelector::new(script(&dir, "cat > /dev/null; exit 130"));
        let err = selector.select(&tasks()).unwrap_err();
        assert_eq!(err.to_string(), "cancelled");
    }
}
