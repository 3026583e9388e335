use std::fmt;

use crate::auth::Action;
use crate::model::{TaskId, UserId};

/// Machine-readable error codes shared by the service and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TaskNotFound,
    UserNotFound,
    CyclicRelationship,
    DuplicateEdge,
    InvalidSelfReference,
    InvalidInput,
    Forbidden,
    StoreFailure,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::UserNotFound => "E2002",
            Self::CyclicRelationship => "E2003",
            Self::DuplicateEdge => "E2004",
            Self::InvalidInput => "E2005",
            Self::InvalidSelfReference => "E2006",
            Self::Forbidden => "E4001",
            Self::StoreFailure => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::UserNotFound => "User not found",
            Self::CyclicRelationship => "Hierarchy cycle would be created",
            Self::DuplicateEdge => "Hierarchy link already exists",
            Self::InvalidSelfReference => "Task cannot be its own parent",
            Self::InvalidInput => "Invalid input",
            Self::Forbidden => "Not enough permissions",
            Self::StoreFailure => "Task store failure",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `tl init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .trellis/config.toml and retry."),
            Self::TaskNotFound | Self::UserNotFound | Self::InvalidInput => None,
            Self::CyclicRelationship => {
                Some("Link in the other direction or unlink an ancestor first.")
            }
            Self::DuplicateEdge => Some("Set hierarchy.strict_edges = false to allow re-linking."),
            Self::InvalidSelfReference => Some("Pick two different tasks."),
            Self::Forbidden => {
                Some("Only a task's creator or an admin/manager may change it.")
            }
            Self::StoreFailure => Some("Check that the database is writable and not locked."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the hierarchy service.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("task {0} cannot be its own parent")]
    InvalidSelfReference(TaskId),

    #[error("linking {parent} → {child} would create a cycle: {}", render_path(.path))]
    CyclicRelationship {
        parent: TaskId,
        child: TaskId,
        /// `parent → child → … → parent` once the proposed edge is added.
        path: Vec<TaskId>,
    },

    #[error("link {parent} → {child} already exists")]
    DuplicateEdge { parent: TaskId, child: TaskId },

    #[error("user {actor} may not {action}")]
    Forbidden { actor: UserId, action: Action },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

impl HierarchyError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound(_) => ErrorCode::TaskNotFound,
            Self::UserNotFound(_) => ErrorCode::UserNotFound,
            Self::InvalidSelfReference(_) => ErrorCode::InvalidSelfReference,
            Self::CyclicRelationship { .. } => ErrorCode::CyclicRelationship,
            Self::DuplicateEdge { .. } => ErrorCode::DuplicateEdge,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Internal(_) => ErrorCode::InternalUnexpected,
            Self::Db(_) => ErrorCode::StoreFailure,
        }
    }

    /// Self-references count as cycles of length one.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(
            self,
            Self::CyclicRelationship { .. } | Self::InvalidSelfReference(_)
        )
    }
}

impl From<rusqlite::Error> for HierarchyError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Db(anyhow::Error::new(error))
    }
}

fn render_path(path: &[TaskId]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}
