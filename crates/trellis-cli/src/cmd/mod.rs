//! Subcommand handlers. Each module owns one verb: an `Args` struct and a
//! `run_*` entry point taking the output mode and project root.

pub mod assign;
pub mod create;
pub mod delete;
pub mod init;
pub mod link;
pub mod show;
pub mod stats;
pub mod status;
pub mod subtask;
pub mod user;
pub mod verify;

use std::path::Path;

use trellis_core::config::PROJECT_DIR;
use trellis_core::model::UserId;
use trellis_core::{ErrorCode, HierarchyError, HierarchyService};

use crate::actor;
use crate::output::{CliError, OutputMode, render_error};

/// Open the project's service, reporting a missing `.trellis` directory or
/// an unreadable store before bailing.
pub fn open_service(project_root: &Path, output: OutputMode) -> anyhow::Result<HierarchyService> {
    if !project_root.join(PROJECT_DIR).is_dir() {
        render_error(
            output,
            &CliError::from_code(
                ErrorCode::NotInitialized,
                format!("no {PROJECT_DIR} directory in {}", project_root.display()),
            ),
        )?;
        anyhow::bail!("project not initialized");
    }

    match HierarchyService::open(project_root) {
        Ok(svc) => Ok(svc),
        Err(e) => {
            render_error(output, &CliError::from_code(ErrorCode::StoreFailure, format!("{e:#}")))?;
            Err(e)
        }
    }
}

/// Resolve the acting user, reporting the failure before bailing.
pub fn require_actor(actor_flag: Option<UserId>, output: OutputMode) -> anyhow::Result<UserId> {
    match actor::require_actor(actor_flag) {
        Ok(actor) => Ok(actor),
        Err(e) => {
            render_error(
                output,
                &CliError::with_details(
                    &e.message,
                    "Pass --as <USER_ID> or set TRELLIS_ACTOR",
                    e.code,
                ),
            )?;
            anyhow::bail!("{}", e.message);
        }
    }
}

/// Render a service error and convert it for `main`.
pub fn fail(output: OutputMode, err: HierarchyError) -> anyhow::Error {
    match render_error(output, &CliError::from(&err)) {
        Ok(()) => anyhow::Error::new(err),
        Err(io) => io.into(),
    }
}
