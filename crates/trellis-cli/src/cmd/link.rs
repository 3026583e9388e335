//! `tl link` / `tl unlink`: manage parent/child edges.

use std::path::Path;

use clap::Args;
use serde::Serialize;
use trellis_core::model::{TaskId, UserId};

use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, format_us, render};

/// Arguments shared by `tl link` and `tl unlink`.
#[derive(Args, Debug)]
pub struct EdgeArgs {
    /// Parent task id.
    pub parent: TaskId,

    /// Child task id.
    pub child: TaskId,
}

#[derive(Debug, Serialize)]
struct UnlinkResult {
    parent_id: TaskId,
    child_id: TaskId,
    removed: bool,
}

/// Execute `tl link`. Rejected links report the cycle path.
pub fn run_link(
    args: &EdgeArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let edge = svc
        .create_hierarchy(args.parent, args.child, actor)
        .map_err(|e| fail(output, e))?;

    render(output, &edge, |e, w| {
        writeln!(
            w,
            "✓ #{} → #{} (edge {}, {})",
            e.parent_id,
            e.child_id,
            e.edge_id,
            format_us(e.created_at_us)
        )
    })?;
    Ok(())
}

/// Execute `tl unlink`. Unlinking tasks that are not linked succeeds with
/// `removed: false`.
pub fn run_unlink(
    args: &EdgeArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    let removed = svc
        .remove_hierarchy(args.parent, args.child, actor)
        .map_err(|e| fail(output, e))?;

    let result = UnlinkResult {
        parent_id: args.parent,
        child_id: args.child,
        removed,
    };
    render(output, &result, |r, w| {
        if r.removed {
            writeln!(w, "✓ Unlinked #{} → #{}", r.parent_id, r.child_id)
        } else {
            writeln!(w, "#{} → #{} was not linked", r.parent_id, r.child_id)
        }
    })?;
    Ok(())
}
