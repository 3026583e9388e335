//! `tl stats`: task counts by status.

use std::path::Path;

use clap::Args;

use crate::cmd::{fail, open_service};
use crate::output::{OutputMode, render, text_kv};

#[derive(Args, Debug, Default)]
pub struct StatsArgs {}

pub fn run_stats(_args: &StatsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let svc = open_service(project_root, output)?;
    let stats = svc.task_stats().map_err(|e| fail(output, e))?;

    render(output, &stats, |s, w| {
        text_kv(w, "Total", s.total.to_string())?;
        text_kv(w, "Open", s.open.to_string())?;
        text_kv(w, "In progress", s.in_progress.to_string())?;
        text_kv(w, "Review", s.review.to_string())?;
        text_kv(w, "Completed", s.completed.to_string())
    })?;
    Ok(())
}
