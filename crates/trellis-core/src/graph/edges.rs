//! Durable parent → child edges in `task_hierarchy`.
//!
//! Edge reads are ordered by `edge_id`, i.e. insertion order, so traversals
//! built on them are deterministic.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::db::query;
use crate::error::HierarchyError;
use crate::model::TaskId;

/// A stored hierarchy edge: `parent_id` is composed of `child_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HierarchyEdge {
    pub edge_id: i64,
    pub parent_id: TaskId,
    pub child_id: TaskId,
    pub created_at_us: i64,
}

/// How [`add_edge`] treats a pair that is already linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Return the stored edge unchanged.
    #[default]
    Idempotent,
    /// Fail with [`HierarchyError::DuplicateEdge`].
    Strict,
}

impl EdgeMode {
    #[must_use]
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Idempotent }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddEdgeOutcome {
    Created(HierarchyEdge),
    Existing(HierarchyEdge),
}

impl AddEdgeOutcome {
    #[must_use]
    pub const fn edge(&self) -> HierarchyEdge {
        match self {
            Self::Created(edge) | Self::Existing(edge) => *edge,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Insert `parent → child`.
///
/// Does not check for cycles; callers run
/// [`check_edge`](super::cycles::check_edge) first, in the same transaction.
///
/// # Errors
///
/// - [`HierarchyError::InvalidSelfReference`] when `parent == child`
/// - [`HierarchyError::TaskNotFound`] when either task is missing
/// - [`HierarchyError::DuplicateEdge`] for an existing pair in strict mode
/// - [`HierarchyError::Db`] on store failure
pub fn add_edge(
    conn: &Connection,
    parent: TaskId,
    child: TaskId,
    mode: EdgeMode,
    now_us: i64,
) -> Result<AddEdgeOutcome, HierarchyError> {
    if parent == child {
        return Err(HierarchyError::InvalidSelfReference(parent));
    }
    for task_id in [parent, child] {
        if query::get_task(conn, task_id)?.is_none() {
            return Err(HierarchyError::TaskNotFound(task_id));
        }
    }

    if let Some(existing) = find_edge(conn, parent, child)? {
        return match mode {
            EdgeMode::Idempotent => Ok(AddEdgeOutcome::Existing(existing)),
            EdgeMode::Strict => Err(HierarchyError::DuplicateEdge { parent, child }),
        };
    }

    conn.execute(
        "INSERT INTO task_hierarchy (parent_id, child_id, created_at_us) VALUES (?1, ?2, ?3)",
        params![parent, child, now_us],
    )
    .with_context(|| format!("insert hierarchy edge {parent} → {child}"))?;

    Ok(AddEdgeOutcome::Created(HierarchyEdge {
        edge_id: conn.last_insert_rowid(),
        parent_id: parent,
        child_id: child,
        created_at_us: now_us,
    }))
}

/// Look up the edge for an exact pair.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_edge(conn: &Connection, parent: TaskId, child: TaskId) -> Result<Option<HierarchyEdge>> {
    conn.query_row(
        "SELECT edge_id, parent_id, child_id, created_at_us FROM task_hierarchy \
         WHERE parent_id = ?1 AND child_id = ?2",
        params![parent, child],
        row_to_edge,
    )
    .optional()
    .with_context(|| format!("find_edge {parent} → {child}"))
}

/// Edges where `child` is the child, i.e. links to its parents.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn edges_by_child(conn: &Connection, child: TaskId) -> Result<Vec<HierarchyEdge>> {
    collect_edges(
        conn,
        "SELECT edge_id, parent_id, child_id, created_at_us FROM task_hierarchy \
         WHERE child_id = ?1 ORDER BY edge_id",
        child,
    )
    .with_context(|| format!("edges_by_child for {child}"))
}

/// Edges where `parent` is the parent, i.e. links to its children.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn edges_by_parent(conn: &Connection, parent: TaskId) -> Result<Vec<HierarchyEdge>> {
    collect_edges(
        conn,
        "SELECT edge_id, parent_id, child_id, created_at_us FROM task_hierarchy \
         WHERE parent_id = ?1 ORDER BY edge_id",
        parent,
    )
    .with_context(|| format!("edges_by_parent for {parent}"))
}

/// Every edge, in insertion order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn all_edges(conn: &Connection) -> Result<Vec<HierarchyEdge>> {
    let mut stmt = conn
        .prepare(
            "SELECT edge_id, parent_id, child_id, created_at_us FROM task_hierarchy \
             ORDER BY edge_id",
        )
        .context("prepare all_edges")?;
    let rows = stmt.query_map([], row_to_edge).context("execute all_edges")?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row.context("read edge row")?);
    }
    Ok(edges)
}

/// Remove every edge touching `task_id`, in either direction.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_edges_for_task(conn: &Connection, task_id: TaskId) -> Result<usize> {
    conn.execute(
        "DELETE FROM task_hierarchy WHERE parent_id = ?1 OR child_id = ?1",
        params![task_id],
    )
    .with_context(|| format!("remove edges for task {task_id}"))
}

/// Remove a single edge. Returns `false` when the pair was not linked.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_edge(conn: &Connection, parent: TaskId, child: TaskId) -> Result<bool> {
    let removed = conn
        .execute(
            "DELETE FROM task_hierarchy WHERE parent_id = ?1 AND child_id = ?2",
            params![parent, child],
        )
        .with_context(|| format!("remove edge {parent} → {child}"))?;
    Ok(removed > 0)
}

fn collect_edges(conn: &Connection, sql: &str, task_id: TaskId) -> Result<Vec<HierarchyEdge>> {
    let mut stmt = conn.prepare(sql).context("prepare edge query")?;
    let rows = stmt
        .query_map(params![task_id], row_to_edge)
        .context("execute edge query")?;

    let mut edges = Vec::new();
    for row in rows {
        edges.push(row.context("read edge row")?);
    }
    Ok(edges)
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<HierarchyEdge> {
    Ok(HierarchyEdge {
        edge_id: row.get(0)?,
        parent_id: row.get(1)?,
        child_id: row.get(2)?,
        created_at_us: row.get(3)?,
    })
}
