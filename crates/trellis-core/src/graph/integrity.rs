//! Whole-graph integrity check.
//!
//! Incremental validation keeps the edge set acyclic one insert at a time;
//! this module re-checks the stored graph from scratch with Tarjan's SCC
//! algorithm and also reports edges whose endpoints no longer exist.

use anyhow::Result;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashSet;

use super::edges::{self, HierarchyEdge};
use crate::db::query;
use crate::model::TaskId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub task_count: usize,
    pub edge_count: usize,
    /// One sorted entry per strongly connected component with a cycle.
    pub cycles: Vec<Vec<TaskId>>,
    /// Edges referencing a task that is not in the store.
    pub dangling_edges: Vec<HierarchyEdge>,
}

impl IntegrityReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.dangling_edges.is_empty()
    }
}

/// Find every cycle in a `(parent, child)` edge list.
///
/// Self-loops are reported as one-element cycles.
#[must_use]
pub fn find_cycles(edges: &[(TaskId, TaskId)]) -> Vec<Vec<TaskId>> {
    let graph: DiGraphMap<TaskId, ()> = DiGraphMap::from_edges(edges.iter().copied());

    let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.contains_edge(node, node))
        })
        .map(|mut component| {
            component.sort_unstable();
            component
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

/// Check the stored hierarchy.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn verify(conn: &Connection) -> Result<IntegrityReport> {
    let task_ids: HashSet<TaskId> = query::list_task_ids(conn)?.into_iter().collect();
    let stored = edges::all_edges(conn)?;

    let pairs: Vec<(TaskId, TaskId)> = stored.iter().map(|e| (e.parent_id, e.child_id)).collect();
    let dangling_edges = stored
        .iter()
        .filter(|e| !task_ids.contains(&e.parent_id) || !task_ids.contains(&e.child_id))
        .copied()
        .collect();

    let report = IntegrityReport {
        task_count: task_ids.len(),
        edge_count: stored.len(),
        cycles: find_cycles(&pairs),
        dangling_edges,
    };

    if report.is_clean() {
        tracing::debug!(tasks = report.task_count, edges = report.edge_count, "hierarchy verified");
    } else {
        tracing::warn!(
            cycles = report.cycles.len(),
            dangling = report.dangling_edges.len(),
            "hierarchy integrity problems found"
        );
    }

    Ok(report)
}
