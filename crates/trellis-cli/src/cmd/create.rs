//! `tl create`: create a top-level task.

use std::path::Path;

use chrono::{DateTime, NaiveDate};
use clap::Args;
use trellis_core::model::{NewTask, UserId};

use crate::cmd::show::{TaskView, write_task};
use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, render};

/// Task fields shared by `tl create` and `tl subtask`.
#[derive(Args, Debug, Default)]
pub struct TaskFieldArgs {
    /// Task title.
    #[arg(long)]
    pub title: String,

    /// Longer description.
    #[arg(long)]
    pub description: Option<String>,

    /// Due date, as RFC 3339 or `YYYY-MM-DD` (midnight UTC).
    #[arg(long, value_parser = parse_due)]
    pub due: Option<i64>,

    /// Assign a user (repeatable).
    #[arg(long = "assign", value_name = "USER_ID")]
    pub assignees: Vec<UserId>,
}

impl TaskFieldArgs {
    /// Build a [`NewTask`]. `explicit_empty` turns an empty `--assign` list
    /// into an explicit "nobody" instead of the default.
    pub fn to_new_task(&self, explicit_empty: bool) -> NewTask {
        let mut new = NewTask::new(self.title.clone());
        if let Some(description) = &self.description {
            new = new.with_description(description.clone());
        }
        if let Some(due) = self.due {
            new = new.with_due(due);
        }
        if !self.assignees.is_empty() || explicit_empty {
            new = new.with_assignees(self.assignees.clone());
        }
        new
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub fields: TaskFieldArgs,
}

pub fn run_create(
    args: &CreateArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let new = args.fields.to_new_task(false);
    let task = svc.create_task(&new, actor).map_err(|e| fail(output, e))?;
    let assignees = svc.get_assignees(task.id).map_err(|e| fail(output, e))?;

    render(output, &TaskView { task, assignees }, write_task)?;
    Ok(())
}

/// Parse a due date into microseconds since the epoch.
pub fn parse_due(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_micros());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_micros())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got '{raw}'"))
}
