//! `tl subtask`: create a task already linked under a parent.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use trellis_core::graph::HierarchyEdge;
use trellis_core::model::{TaskId, UserId};

use crate::cmd::create::TaskFieldArgs;
use crate::cmd::show::{TaskView, write_task};
use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct SubtaskArgs {
    /// Parent task id.
    pub parent: TaskId,

    #[command(flatten)]
    pub fields: TaskFieldArgs,

    /// Leave the subtask unassigned instead of copying the parent's
    /// assignees.
    #[arg(long, conflicts_with = "assignees")]
    pub unassigned: bool,
}

#[derive(Debug, Serialize)]
struct SubtaskView {
    #[serde(flatten)]
    task: TaskView,
    edge: HierarchyEdge,
}

pub fn run_subtask(
    args: &SubtaskArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let new = args.fields.to_new_task(args.unassigned);
    let created = svc
        .create_subtask(args.parent, &new, actor)
        .map_err(|e| fail(output, e))?;

    let view = SubtaskView {
        task: TaskView {
            task: created.task,
            assignees: created.assignees,
        },
        edge: created.edge,
    };
    render(output, &view, |v, w| {
        write_task(&v.task, w)?;
        writeln!(w, "Linked under #{}", v.edge.parent_id)
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
        args: SubtaskArgs,
    }

    #[test]
    fn parses_parent_and_title() {
        let w = Wrapper::parse_from(["test", "7", "--title", "Write docs"]);
        assert_eq!(w.args.parent, 7);
        assert_eq!(w.args.fields.title, "Write docs");
        assert!(!w.args.unassigned);
        assert_eq!(w.args.fields.to_new_task(w.args.unassigned).assignees, None);
    }

    #[test]
    fn unassigned_forces_empty_list() {
        let w = Wrapper::parse_from(["test", "7", "--title", "x", "--unassigned"]);
        assert_eq!(w.args.fields.to_new_task(w.args.unassigned).assignees, Some(vec![]));
    }

    #[test]
    fn unassigned_conflicts_with_assign() {
        let parsed =
            Wrapper::try_parse_from(["test", "7", "--title", "x", "--unassigned", "--assign", "2"]);
        assert!(parsed.is_err());
    }
}
