//! Cascading completion.
//!
//! When a task reaches `Completed`, each of its parents whose children are
//! now all completed is completed too, and so on upward. The walk is an
//! explicit worklist rather than recursion.
//!
//! Every completed parent is enqueued once, whether this walk completed it
//! or it already was, so the walk still reaches ancestors left open by an
//! earlier skipped cascade. Diamonds complete a shared ancestor once, and
//! the walk terminates because the graph is acyclic and each task is
//! visited at most once.

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use crate::error::HierarchyError;
use crate::model::{TaskId, TaskStatus};

/// What the cascade needs from its host.
///
/// `mark_completed` must go through the same permission-checked path as a
/// direct status update.
pub trait CompletionTarget {
    /// Immediate parents of `task`, in insertion order.
    ///
    /// # Errors
    ///
    /// Store failures.
    fn parent_ids(&self, task: TaskId) -> Result<Vec<TaskId>, HierarchyError>;

    /// Statuses of every immediate child of `parent`.
    ///
    /// # Errors
    ///
    /// Store failures.
    fn child_statuses(&self, parent: TaskId) -> Result<Vec<TaskStatus>, HierarchyError>;

    /// # Errors
    ///
    /// [`HierarchyError::TaskNotFound`] or store failures.
    fn status_of(&self, task: TaskId) -> Result<TaskStatus, HierarchyError>;

    /// # Errors
    ///
    /// [`HierarchyError::Forbidden`] when the acting user may not complete
    /// `task`; store failures otherwise.
    fn mark_completed(&mut self, task: TaskId) -> Result<(), HierarchyError>;
}

/// Outcome of one cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropagationReport {
    /// Parents auto-completed, in the order they were completed.
    pub completed: Vec<TaskId>,
    /// Parents whose children were all completed but that the actor may
    /// not complete.
    pub skipped: Vec<TaskId>,
}

impl PropagationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.skipped.is_empty()
    }
}

/// Cascade completion upward from `completed_task`.
///
/// # Errors
///
/// Returns the first non-permission error. Permission failures are logged
/// and recorded in [`PropagationReport::skipped`].
#[tracing::instrument(level = "debug", skip(target))]
pub fn propagate_completion<T>(
    target: &mut T,
    completed_task: TaskId,
) -> Result<PropagationReport, HierarchyError>
where
    T: CompletionTarget + ?Sized,
{
    let mut report = PropagationReport::default();
    let mut worklist = VecDeque::from([completed_task]);
    let mut visited = HashSet::from([completed_task]);

    while let Some(task) = worklist.pop_front() {
        for parent in target.parent_ids(task)? {
            if target.status_of(parent)?.is_terminal() {
                if visited.insert(parent) {
                    worklist.push_back(parent);
                }
                continue;
            }
            if !target
                .child_statuses(parent)?
                .iter()
                .all(|status| status.is_terminal())
            {
                continue;
            }

            match target.mark_completed(parent) {
                Ok(()) => {
                    tracing::info!(task = parent, from = task, "auto-completed parent");
                    report.completed.push(parent);
                    if visited.insert(parent) {
                        worklist.push_back(parent);
                    }
                }
                Err(HierarchyError::Forbidden { actor, .. }) => {
                    tracing::warn!(
                        task = parent,
                        actor,
                        "skipping auto-completion: actor may not update parent"
                    );
                    if !report.skipped.contains(&parent) {
                        report.skipped.push(parent);
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    Ok(report)
}
