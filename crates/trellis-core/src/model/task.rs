use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Opaque task identity (SQLite rowid).
pub type TaskId = i64;

/// Opaque user identity (SQLite rowid).
pub type UserId = i64;

/// The four task lifecycle states.
///
/// Only `Completed` carries meaning for the hierarchy: it is the terminal
/// state that cascading completion propagates upward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Review,
    Completed,
}

impl TaskStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Review, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Completed => "completed",
        }
    }

    /// `true` for the state that triggers cascading completion.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "doing" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// A task row from the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub due_at_us: Option<i64>,
    pub status: TaskStatus,
    pub creator_id: UserId,
    pub created_at_us: i64,
    pub updated_at_us: i64,
}

/// Input for creating a task or a subtask.
///
/// `assignees = None` means "use the default": nobody for a top-level task,
/// the parent's current assignee set for a subtask.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at_us: Option<i64>,
    #[serde(default)]
    pub assignees: Option<Vec<UserId>>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn with_due(mut self, due_at_us: i64) -> Self {
        self.due_at_us = Some(due_at_us);
        self
    }

    #[must_use]
    pub fn with_assignees(mut self, assignees: Vec<UserId>) -> Self {
        self.assignees = Some(assignees);
        self
    }

    /// The trimmed title, or `None` when it is blank.
    #[must_use]
    pub fn normalized_title(&self) -> Option<&str> {
        let trimmed = self.title.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
