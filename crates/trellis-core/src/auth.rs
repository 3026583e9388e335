//! Authorization seam for the hierarchy service.
//!
//! The service loads the rows a decision needs and asks an [`Authorizer`];
//! it never inspects roles itself. [`RolePolicy`] is the default, built on
//! the creator / elevated-privilege / assignee predicates below.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Task, User, UserId};

/// A guarded mutation, used in `Forbidden` errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateTask,
    Link,
    Unlink,
    UpdateStatus,
    Assign,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateTask => "create tasks",
            Self::Link => "link tasks",
            Self::Unlink => "unlink tasks",
            Self::UpdateStatus => "update task status",
            Self::Assign => "assign users",
            Self::Delete => "delete tasks",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability predicates consulted before every mutation.
///
/// Unlinking uses [`Authorizer::can_link`].
pub trait Authorizer {
    fn can_create_task(&self, actor: &User) -> bool;

    fn can_link(&self, actor: &User, parent: &Task, child: &Task) -> bool;

    /// `assignees` is the task's current assignee set.
    fn can_update_status(&self, actor: &User, task: &Task, assignees: &[UserId]) -> bool;

    fn can_assign(&self, actor: &User, task: &Task) -> bool;

    fn can_delete(&self, actor: &User, task: &Task) -> bool;
}

#[must_use]
pub const fn is_creator(task: &Task, user: UserId) -> bool {
    task.creator_id == user
}

#[must_use]
pub const fn has_elevated_privilege(user: &User) -> bool {
    user.role.can_delete_tasks()
}

#[must_use]
pub fn is_assignee(assignees: &[UserId], user: UserId) -> bool {
    assignees.contains(&user)
}

/// Creator-or-elevated policy.
///
/// Linking needs a stake in at least one side. Status changes also admit
/// assignees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy;

impl Authorizer for RolePolicy {
    fn can_create_task(&self, actor: &User) -> bool {
        actor.role.can_create_task()
    }

    fn can_link(&self, actor: &User, parent: &Task, child: &Task) -> bool {
        is_creator(parent, actor.id) || is_creator(child, actor.id) || has_elevated_privilege(actor)
    }

    fn can_update_status(&self, actor: &User, task: &Task, assignees: &[UserId]) -> bool {
        is_creator(task, actor.id)
            || is_assignee(assignees, actor.id)
            || has_elevated_privilege(actor)
    }

    fn can_assign(&self, actor: &User, task: &Task) -> bool {
        is_creator(task, actor.id) || has_elevated_privilege(actor)
    }

    fn can_delete(&self, actor: &User, task: &Task) -> bool {
        is_creator(task, actor.id) || has_elevated_privilege(actor)
    }
}
