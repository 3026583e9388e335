use std::path::Path;

use clap::Args;
use trellis_core::model::{TaskId, UserId};

use crate::cmd::{fail, open_service, require_actor};
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task id.
    pub id: TaskId,
}

/// Execute `tl delete`. The task's edges and assignments go with it; its
/// children stay.
pub fn run_delete(
    args: &DeleteArgs,
    actor_flag: Option<UserId>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let actor = require_actor(actor_flag, output)?;
    let mut svc = open_service(project_root, output)?;

    svc.delete_task(args.id, actor).map_err(|e| fail(output, e))?;

    render_success(output, &format!("Deleted task #{}", args.id))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: DeleteArgs,
    }

    #[test]
    fn parses_id() {
        let w = Wrapper::parse_from(["test", "12"]);
        assert_eq!(w.args.id, 12);
    }
}
