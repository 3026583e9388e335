//! Cycle validation for proposed hierarchy edges.
//!
//! # Overview
//!
//! Adding `parent → child` closes a cycle exactly when `child` is already an
//! ancestor of `parent`. [`check_edge`] answers that before the edge is
//! written, by walking *up* from `parent` through existing parent edges.
//!
//! # Design
//!
//! - **BFS with a visited set**: each task is expanded once. Reaching a task
//!   a second time through another path is a diamond, not a cycle, and is
//!   simply not re-enqueued.
//! - **Deterministic**: parents are visited in edge insertion order, so two
//!   validations of the same graph walk it identically.
//! - **O(V+E)** per check.
//! - **Storage-agnostic**: the walk only needs [`HierarchyRead`], which the
//!   SQLite connection and [`MemoryHierarchy`](super::memory::MemoryHierarchy)
//!   both provide. Inside the service it runs on the same transaction that
//!   inserts the edge.

#![allow(clippy::module_name_repetitions)]

use anyhow::Result;
use rusqlite::Connection;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use super::edges;
use crate::model::TaskId;

/// Read access to parent links, enough to enumerate ancestors.
pub trait HierarchyRead {
    /// Immediate parents of `child`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn parent_ids(&self, child: TaskId) -> Result<Vec<TaskId>>;
}

impl HierarchyRead for Connection {
    fn parent_ids(&self, child: TaskId) -> Result<Vec<TaskId>> {
        Ok(edges::edges_by_child(self, child)?
            .into_iter()
            .map(|edge| edge.parent_id)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// CycleViolation
// ---------------------------------------------------------------------------

/// A proposed edge that would break the DAG invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleViolation {
    /// Starts and ends at `edge_from`. Proposing `C → A` over existing
    /// `A → B → C` yields `[C, A, B, C]`.
    pub cycle_path: Vec<TaskId>,
    pub edge_from: TaskId,
    pub edge_to: TaskId,
}

impl CycleViolation {
    /// Distinct tasks in the loop.
    #[must_use]
    pub const fn cycle_len(&self) -> usize {
        self.cycle_path.len().saturating_sub(1)
    }

    #[must_use]
    pub const fn is_self_loop(&self) -> bool {
        self.edge_from == self.edge_to
    }
}

impl fmt::Display for CycleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self_loop() {
            return write!(f, "self-loop on task {}", self.edge_from);
        }
        let path = self
            .cycle_path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");
        write!(f, "cycle of {} tasks: {path}", self.cycle_len())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Decide whether `parent → child` keeps the hierarchy acyclic.
///
/// Returns `None` when the edge is safe. An already-stored edge is always
/// safe: the graph is acyclic, so `child` cannot also be an ancestor.
///
/// # Errors
///
/// Propagates read failures from `graph`.
#[tracing::instrument(level = "debug", skip(graph))]
pub fn check_edge<G>(graph: &G, parent: TaskId, child: TaskId) -> Result<Option<CycleViolation>>
where
    G: HierarchyRead + ?Sized,
{
    if parent == child {
        return Ok(Some(CycleViolation {
            cycle_path: vec![parent, parent],
            edge_from: parent,
            edge_to: child,
        }));
    }

    let mut queue = VecDeque::from([parent]);
    let mut visited = HashSet::from([parent]);
    // ancestor -> the task it was reached from, one step down
    let mut reached_from: HashMap<TaskId, TaskId> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == child {
            let violation = CycleViolation {
                cycle_path: reconstruct_cycle_path(parent, child, &reached_from),
                edge_from: parent,
                edge_to: child,
            };
            tracing::debug!(%violation, "rejecting hierarchy edge");
            return Ok(Some(violation));
        }

        for up in graph.parent_ids(current)? {
            if visited.insert(up) {
                reached_from.insert(up, current);
                queue.push_back(up);
            }
        }
    }

    Ok(None)
}

/// Every ancestor of `start`, including `start` itself.
///
/// # Errors
///
/// Propagates read failures from `graph`.
pub fn ancestor_set<G>(graph: &G, start: TaskId) -> Result<HashSet<TaskId>>
where
    G: HierarchyRead + ?Sized,
{
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for up in graph.parent_ids(current)? {
            if visited.insert(up) {
                queue.push_back(up);
            }
        }
    }

    Ok(visited)
}

fn reconstruct_cycle_path(
    parent: TaskId,
    child: TaskId,
    reached_from: &HashMap<TaskId, TaskId>,
) -> Vec<TaskId> {
    // Walking reached_from from `child` descends the existing path
    // child → … → parent; prepend `parent` for the proposed edge.
    let mut path = vec![parent, child];
    let mut cursor = child;
    while cursor != parent {
        let Some(next) = reached_from.get(&cursor) else {
            break;
        };
        cursor = *next;
        path.push(cursor);
    }
    path
}
