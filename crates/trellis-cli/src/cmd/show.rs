//! `tl show`: a task with its assignees, parents, and children.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use serde::Serialize;
use trellis_core::model::{Task, TaskId, UserId};

use crate::cmd::{fail, open_service};
use crate::output::{OutputMode, format_us, id_list, render, text_kv};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task id.
    pub id: TaskId,
}

/// A task together with its current assignee set.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<UserId>,
}

#[derive(Debug, Serialize)]
struct ShowView {
    #[serde(flatten)]
    task: TaskView,
    parents: Vec<Task>,
    children: Vec<Task>,
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let svc = open_service(project_root, output)?;

    let hierarchy = svc.get_hierarchy(args.id).map_err(|e| fail(output, e))?;
    let assignees = svc.get_assignees(args.id).map_err(|e| fail(output, e))?;

    let view = ShowView {
        task: TaskView {
            task: hierarchy.task,
            assignees,
        },
        parents: hierarchy.parents,
        children: hierarchy.children,
    };

    render(output, &view, |v, w| {
        write_task(&v.task, w)?;
        write_related(w, "Parents", &v.parents)?;
        write_related(w, "Children", &v.children)
    })?;
    Ok(())
}

/// Text rendering of one task, shared by the commands that print a task.
pub fn write_task(view: &TaskView, w: &mut dyn Write) -> io::Result<()> {
    let task = &view.task;
    writeln!(w, "#{} {}", task.id, task.title)?;
    text_kv(w, "Status", task.status.as_str())?;
    if let Some(description) = &task.description {
        text_kv(w, "Description", description)?;
    }
    if let Some(due) = task.due_at_us {
        text_kv(w, "Due", format_us(due))?;
    }
    text_kv(w, "Creator", task.creator_id.to_string())?;
    text_kv(w, "Assignees", id_list(&view.assignees))?;
    text_kv(w, "Updated", format_us(task.updated_at_us))
}

fn write_related(w: &mut dyn Write, heading: &str, tasks: &[Task]) -> io::Result<()> {
    if tasks.is_empty() {
        return Ok(());
    }
    writeln!(w)?;
    writeln!(w, "{heading}:")?;
    for task in tasks {
        writeln!(w, "  #{:<6} [{}] {}", task.id, task.status, task.title)?;
    }
    Ok(())
}
