use std::io::Write;

use tracing::{debug, warn};

use crate::auth;
use crate::cli::CliCommand;
use crate::client::TaskClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::mirror::MirrorStore;
use crate::model::{Task, TaskDraft, short_id};
use crate::output;
use crate::selector::{FzfSelector, TaskSelector};

/// Run one CLI command against the configured service.
pub fn run(command: CliCommand, config: &Config, out: &mut dyn Write) -> Result<()> {
    if command == CliCommand::Logout {
        return logout(config, out);
    }
    let client = TaskClient::from_config(config)?;
    execute(&client, command, out)
}

/// Run a command with an already-built client. Commands given no task id
/// ask `fzf` for one.
pub fn execute(client: &TaskClient, command: CliCommand, out: &mut dyn Write) -> Result<()> {
    execute_with(client, &FzfSelector::default(), command, out)
}

pub fn execute_with(
    client: &TaskClient,
    selector: &dyn TaskSelector,
    command: CliCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        CliCommand::List { tasklist, json } => {
            let tasks = match tasklist {
                Some(name) => {
                    let list_id = client.resolve_list_id(&name)?;
                    client.list_tasks(&list_id)?
                }
                None => client.list_all_tasks()?,
            };
            if json {
                output::write_json(out, &tasks)?;
            } else {
                output::write_table(out, &tasks)?;
            }
        }
        CliCommand::Add {
            title,
            tasklist,
            notes,
            due,
        } => {
            let list_id = client.resolve_list_id(&tasklist)?;
            let draft = TaskDraft {
                notes: notes.unwrap_or_default(),
                due,
                ..TaskDraft::titled(title)
            };
            let task = client.create_task(&list_id, &draft)?;
            writeln!(out, "Task added: {} (ID: {})", task.title, task.short_id())?;
        }
        CliCommand::Done { task_id, tasklist } => {
            let task = locate(client, selector, task_id.as_deref(), tasklist.as_deref())?;
            let done = client.complete_task(&task.list_id, &task.id)?;
            writeln!(out, "Task completed: {} (ID: {})", done.title, done.short_id())?;
        }
        CliCommand::Delete { task_id, tasklist } => {
            let task = locate(client, selector, task_id.as_deref(), tasklist.as_deref())?;
            let deleted_id = client.delete_task(&task.list_id, &task.id)?;
            writeln!(
                out,
                "Task deleted: {} (ID: {})",
                task.title,
                short_id(&deleted_id)
            )?;
        }
        CliCommand::Edit {
            task_id,
            tasklist,
            title,
            notes,
            due,
            clear_due,
            status,
            move_to,
        } => {
            let task = locate(client, selector, task_id.as_deref(), tasklist.as_deref())?;
            let mut fields = TaskDraft::from(&task);
            if let Some(title) = title {
                fields.title = title;
            }
            if let Some(notes) = notes {
                fields.notes = notes;
            }
            if clear_due {
                fields.due = None;
            } else if due.is_some() {
                fields.due = due;
            }
            if let Some(status) = status {
                fields.status = status;
            }

            match move_to {
                Some(target) => {
                    let to_list_id = client.resolve_list_id(&target)?;
                    let moved = client.move_task(&task, &to_list_id, &fields)?;
                    writeln!(
                        out,
                        "Task updated: {} (ID: {}, moved to '{}', new ID: {})",
                        moved.title,
                        task.short_id(),
                        moved.list_title,
                        moved.short_id()
                    )?;
                }
                None if fields == TaskDraft::from(&task) => {
                    writeln!(out, "No changes for task {}.", task.short_id())?;
                }
                None => {
                    let updated = client.update_task(&task.list_id, &task.id, &fields)?;
                    writeln!(
                        out,
                        "Task updated: {} (ID: {})",
                        updated.title,
                        updated.short_id()
                    )?;
                }
            }
        }
        CliCommand::Logout => clear_mirror(client.mirror(), out)?,
    }
    Ok(())
}

/// Find the task a command targets: within `-l` when given, otherwise in
/// whichever list holds it first. Without an id the user picks one from the
/// open tasks in scope.
fn locate(
    client: &TaskClient,
    selector: &dyn TaskSelector,
    task_id: Option<&str>,
    tasklist: Option<&str>,
) -> Result<Task> {
    let Some(task_id) = task_id else {
        let tasks = match tasklist {
            Some(name) => client.list_tasks(&client.resolve_list_id(name)?)?,
            None => client.list_all_tasks()?,
        };
        let index = selector.select(&tasks)?;
        debug!(index, count = tasks.len(), "task selected");
        return tasks
            .into_iter()
            .nth(index)
            .ok_or_else(|| Error::Selection("invalid selection".to_string()));
    };
    match tasklist {
        Some(name) => {
            let list_id = client.resolve_list_id(name)?;
            client.get_task(&list_id, task_id)
        }
        None => client.find_task(task_id),
    }
}

/// Logout runs without a client so that it works with no usable token.
fn logout(config: &Config, out: &mut dyn Write) -> Result<()> {
    let removed = auth::remove_token(config.token_path.as_deref())?;
    debug!(removed, "token file");
    clear_mirror(&config.mirror_store(), out)
}

fn clear_mirror(mirror: &MirrorStore, out: &mut dyn Write) -> Result<()> {
    if let Err(e) = mirror.invalidate() {
        warn!(error = %e, "failed to clear task mirror");
    }
    writeln!(out, "Logged out.")?;
    Ok(())
}
