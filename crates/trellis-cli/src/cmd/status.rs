//! `tl status`: move a task through its lifecycle.

use std::path::Path;

use clap::Args;
use trellis_core::model::{TaskId, TaskStatus, UserId};

use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, id_list, render};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Task id.
    pub id: TaskId,

    /// New status: open, in_progress, review, or completed.
    pub status: TaskStatus,
}

/// Execute `tl status`. Completing a task may complete its ancestors; those
/// are listed in the output.
pub fn run_status(
    args: &StatusArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let update = svc
        .update_status(args.id, args.status, actor)
        .map_err(|e| fail(output, e))?;

    render(output, &update, |u, w| {
        writeln!(w, "✓ #{} is now {}", u.task.id, u.task.status)?;
        if !u.propagation.completed.is_empty() {
            writeln!(w, "  auto-completed: {}", id_list(&u.propagation.completed))?;
        }
        if !u.propagation.skipped.is_empty() {
            writeln!(w, "  not permitted to complete: {}", id_list(&u.propagation.skipped))?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: StatusArgs,
    }

    #[test]
    fn parses_status_aliases() {
        let w = Wrapper::parse_from(["test", "3", "done"]);
        assert_eq!(w.args.status, TaskStatus::Completed);

        let w = Wrapper::parse_from(["test", "3", "in-progress"]);
        assert_eq!(w.args.status, TaskStatus::InProgress);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(Wrapper::try_parse_from(["test", "3", "archived"]).is_err());
    }
}
