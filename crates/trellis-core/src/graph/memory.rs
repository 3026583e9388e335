//! In-memory hierarchy with the same link semantics as the store.
//!
//! Used for property tests and for reasoning about edge sets without a
//! database.

use std::collections::BTreeMap;

use super::cycles::{HierarchyRead, check_edge};
use crate::error::HierarchyError;
use crate::model::TaskId;

#[derive(Debug, Clone, Default)]
pub struct MemoryHierarchy {
    parents: BTreeMap<TaskId, Vec<TaskId>>,
    children: BTreeMap<TaskId, Vec<TaskId>>,
}

impl MemoryHierarchy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add `parent → child`.
    ///
    /// Returns `Ok(false)` when the pair was already linked.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::InvalidSelfReference`] or
    /// [`HierarchyError::CyclicRelationship`] when the edge would close a
    /// cycle.
    pub fn link(&mut self, parent: TaskId, child: TaskId) -> Result<bool, HierarchyError> {
        if let Some(violation) = check_edge(self, parent, child)? {
            return Err(if violation.is_self_loop() {
                HierarchyError::InvalidSelfReference(parent)
            } else {
                HierarchyError::CyclicRelationship {
                    parent,
                    child,
                    path: violation.cycle_path,
                }
            });
        }

        let siblings = self.children.entry(parent).or_default();
        if siblings.contains(&child) {
            return Ok(false);
        }
        siblings.push(child);
        self.parents.entry(child).or_default().push(parent);
        Ok(true)
    }

    /// Returns `false` when the pair was not linked.
    pub fn unlink(&mut self, parent: TaskId, child: TaskId) -> bool {
        let Some(siblings) = self.children.get_mut(&parent) else {
            return false;
        };
        let before = siblings.len();
        siblings.retain(|&id| id != child);
        if siblings.len() == before {
            return false;
        }
        if let Some(parents) = self.parents.get_mut(&child) {
            parents.retain(|&id| id != parent);
        }
        true
    }

    #[must_use]
    pub fn children_of(&self, parent: TaskId) -> &[TaskId] {
        self.children.get(&parent).map_or(&[], Vec::as_slice)
    }

    /// All edges as `(parent, child)`, grouped by parent.
    #[must_use]
    pub fn edges(&self) -> Vec<(TaskId, TaskId)> {
        self.children
            .iter()
            .flat_map(|(&parent, kids)| kids.iter().map(move |&child| (parent, child)))
            .collect()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }
}

impl HierarchyRead for MemoryHierarchy {
    fn parent_ids(&self, child: TaskId) -> anyhow::Result<Vec<TaskId>> {
        Ok(self.parents.get(&child).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_is_idempotent() {
        let mut graph = MemoryHierarchy::new();
        assert!(graph.link(1, 2).unwrap());
        assert!(!graph.link(1, 2).unwrap());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.parent_ids(2).unwrap(), vec![1]);
    }

    #[test]
    fn link_rejects_cycles_without_mutating() {
        let mut graph = MemoryHierarchy::new();
        graph.link(1, 2).unwrap();
        graph.link(2, 3).unwrap();

        let err = graph.link(3, 1).unwrap_err();
        assert!(err.is_cycle());
        assert!(matches!(graph.link(4, 4), Err(HierarchyError::InvalidSelfReference(4))));
        assert_eq!(graph.edges(), vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn unlink_allows_reverse_link() {
        let mut graph = MemoryHierarchy::new();
        graph.link(1, 2).unwrap();
        assert!(graph.unlink(1, 2));
        assert!(!graph.unlink(1, 2));
        assert!(graph.link(2, 1).unwrap());
        assert_eq!(graph.children_of(2), &[1]);
        assert!(graph.children_of(1).is_empty());
    }
}
