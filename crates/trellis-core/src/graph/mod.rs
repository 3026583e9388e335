//! Task hierarchy: edge storage, cycle validation, cascading completion, and
//! integrity checks.

pub mod cycles;
pub mod edges;
pub mod integrity;
pub mod memory;
pub mod propagate;

pub use cycles::{CycleViolation, HierarchyRead, ancestor_set, check_edge};
pub use edges::{AddEdgeOutcome, EdgeMode, HierarchyEdge};
pub use integrity::IntegrityReport;
pub use memory::MemoryHierarchy;
pub use propagate::{CompletionTarget, PropagationReport, propagate_completion};
