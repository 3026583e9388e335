//! `tl assign`: replace a task's assignee set.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use trellis_core::model::{TaskId, UserId};

use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, id_list, render};

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Task id.
    pub id: TaskId,

    /// User ids forming the new assignee set. With none given the current
    /// set is printed unchanged.
    pub users: Vec<UserId>,
}

#[derive(Debug, Serialize)]
struct AssignResult {
    task_id: TaskId,
    assignees: Vec<UserId>,
}

pub fn run_assign(
    args: &AssignArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let assignees = svc
        .assign_users(args.id, &args.users, actor)
        .map_err(|e| fail(output, e))?;

    let result = AssignResult {
        task_id: args.id,
        assignees,
    };
    render(output, &result, |r, w| {
        writeln!(w, "#{} assignees: {}", r.task_id, id_list(&r.assignees))
    })?;
    Ok(())
}
