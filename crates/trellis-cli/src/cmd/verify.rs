//! `tl verify`: integrity check over the whole hierarchy.

use std::io::Write;
use std::path::Path;

use clap::Args;
use trellis_core::graph::IntegrityReport;

use crate::cmd::{fail, open_service};
use crate::output::{OutputMode, id_list, render};

#[derive(Args, Debug, Default)]
pub struct VerifyArgs {}

/// Execute `tl verify`. Exits non-zero when the report is not clean.
pub fn run_verify(_args: &VerifyArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let svc = open_service(project_root, output)?;
    let report = svc.verify_hierarchy().map_err(|e| fail(output, e))?;

    render(output, &report, write_report)?;

    if !report.is_clean() {
        anyhow::bail!(
            "hierarchy integrity check failed: {} cycle(s), {} dangling edge(s)",
            report.cycles.len(),
            report.dangling_edges.len()
        );
    }
    Ok(())
}

fn write_report(report: &IntegrityReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "tasks: {}  edges: {}", report.task_count, report.edge_count)?;
    if report.is_clean() {
        return writeln!(w, "✓ hierarchy is acyclic");
    }
    for cycle in &report.cycles {
        writeln!(w, "✗ cycle among tasks {}", id_list(cycle))?;
    }
    for edge in &report.dangling_edges {
        writeln!(
            w,
            "✗ dangling edge {}: #{} → #{}",
            edge.edge_id, edge.parent_id, edge.child_id
        )?;
    }
    Ok(())
}
