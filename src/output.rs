use std::io::Write;

use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::Task;

const ID_WIDTH: usize = 8;
const LIST_WIDTH: usize = 16;
const TITLE_WIDTH: usize = 32;
const DUE_WIDTH: usize = 10;

/// Task as printed by `list --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskJson<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    notes: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
    status: &'static str,
    tasklist_id: &'a str,
    tasklist_name: &'a str,
}

impl<'a> From<&'a Task> for TaskJson<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: &task.id,
            title: &task.title,
            notes: &task.notes,
            due: task.due.map(|d| d.to_string()),
            status: task.status.as_str(),
            tasklist_id: &task.list_id,
            tasklist_name: &task.list_title,
        }
    }
}

pub fn write_json(out: &mut dyn Write, tasks: &[Task]) -> std::io::Result<()> {
    let rows: Vec<TaskJson<'_>> = tasks.iter().map(TaskJson::from).collect();
    serde_json::to_writer_pretty(&mut *out, &rows)?;
    writeln!(out)
}

pub fn write_table(out: &mut dyn Write, tasks: &[Task]) -> std::io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "No tasks found.");
    }

    writeln!(
        out,
        "{}  {}  {}  DUE",
        pad_right("ID", ID_WIDTH),
        pad_right("LIST", LIST_WIDTH),
        pad_right("TITLE", TITLE_WIDTH)
    )?;
    writeln!(
        out,
        "{}",
        "-".repeat(ID_WIDTH + LIST_WIDTH + TITLE_WIDTH + DUE_WIDTH + 6)
    )?;
    for task in tasks {
        let due = task
            .due
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}  {}  {}  {}",
            pad_right(task.short_id(), ID_WIDTH),
            pad_right(&truncate(&task.list_title, LIST_WIDTH), LIST_WIDTH),
            pad_right(&truncate(&task.title, TITLE_WIDTH), TITLE_WIDTH),
            due
        )?;
    }
    Ok(())
}

/// Pad with spaces to `width` terminal columns. Wide characters count twice.
fn pad_right(s: &str, width: usize) -> String {
    let used = s.width();
    if used >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - used))
}

/// Clip to `width` terminal columns, marking the cut with `...`.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let (budget, tail) = if width <= 3 { (width, "") } else { (width - 3, "...") };

    let mut kept = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }
    kept.push_str(tail);
    kept
}
