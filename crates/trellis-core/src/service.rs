//! Hierarchy service: the transactional façade over the task store.
//!
//! Every mutation runs in a SQLite `IMMEDIATE` transaction, which takes the
//! write lock before the first read. Cycle validation and edge insertion are
//! therefore one serialized unit across connections and processes.
//!
//! Cascading completion runs after the triggering status write has
//! committed, in its own transaction. A cascade failure rolls back only the
//! cascade and is logged; the caller still sees the child update succeed.

use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::auth::{Action, Authorizer, RolePolicy};
use crate::config::{self, HierarchyConfig, PROJECT_DIR};
use crate::db::{self, query};
use crate::graph::integrity::{self, IntegrityReport};
use crate::graph::{
    AddEdgeOutcome, CompletionTarget, CycleViolation, EdgeMode, HierarchyEdge, PropagationReport,
    check_edge, edges, propagate_completion,
};
use crate::model::{NewTask, Task, TaskId, TaskStatus, User, UserId, UserRole};

pub use crate::error::HierarchyError;

/// A task with its immediate neighbours, each listed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskHierarchy {
    pub task: Task,
    pub parents: Vec<Task>,
    pub children: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtask {
    pub task: Task,
    pub edge: HierarchyEdge,
    pub assignees: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub task: Task,
    pub propagation: PropagationReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub review: usize,
    pub completed: usize,
}

pub struct HierarchyService<A: Authorizer = RolePolicy> {
    conn: Connection,
    authorizer: A,
    config: HierarchyConfig,
}

impl HierarchyService<RolePolicy> {
    /// Open the project store under `<project_root>/.trellis`, applying the
    /// project config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is malformed or the store cannot be
    /// opened or migrated.
    pub fn open(project_root: &Path) -> anyhow::Result<Self> {
        let project = config::load_project_config(project_root)?;
        let path = project_root.join(PROJECT_DIR).join(db::STORE_FILE_NAME);
        let conn = db::open_store(&path, project.store.busy_timeout())?;
        Ok(Self::new(conn, project.hierarchy))
    }

    /// Service over a private in-memory store with default config.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created.
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(db::open_in_memory()?, HierarchyConfig::default()))
    }

    #[must_use]
    pub const fn new(conn: Connection, config: HierarchyConfig) -> Self {
        Self::with_authorizer(conn, RolePolicy, config)
    }
}

impl<A: Authorizer> HierarchyService<A> {
    #[must_use]
    pub const fn with_authorizer(conn: Connection, authorizer: A, config: HierarchyConfig) -> Self {
        Self {
            conn,
            authorizer,
            config,
        }
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub const fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::InvalidInput`] for a blank or taken username.
    #[instrument(skip(self))]
    pub fn create_user(
        &mut self,
        username: &str,
        full_name: Option<&str>,
        role: UserRole,
    ) -> Result<User, HierarchyError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(HierarchyError::InvalidInput("username must not be blank".into()));
        }

        let tx = immediate(&mut self.conn)?;
        if query::find_user_by_username(&tx, username)?.is_some() {
            return Err(HierarchyError::InvalidInput(format!(
                "username '{username}' is already taken"
            )));
        }
        let user = query::insert_user(&tx, username, full_name, role, db::now_us())?;
        tx.commit()?;

        info!(user = user.id, %role, "created user");
        Ok(user)
    }

    /// # Errors
    ///
    /// [`HierarchyError::UserNotFound`] when no such user exists.
    pub fn get_user(&self, user_id: UserId) -> Result<User, HierarchyError> {
        query::get_user(&self.conn, user_id)?.ok_or(HierarchyError::UserNotFound(user_id))
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Create a top-level task in `Open` status.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::InvalidInput`] for a blank title
    /// - [`HierarchyError::Forbidden`] when the actor is unknown or may not
    ///   create tasks
    /// - [`HierarchyError::UserNotFound`] for an unknown explicit assignee
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn create_task(&mut self, new: &NewTask, actor: UserId) -> Result<Task, HierarchyError> {
        let title = require_title(new)?;

        let tx = immediate(&mut self.conn)?;
        let user = load_actor(&tx, actor, Action::CreateTask)?;
        ensure(self.authorizer.can_create_task(&user), actor, Action::CreateTask)?;

        let assignees = match &new.assignees {
            Some(ids) => existing_users(&tx, ids)?,
            None => Vec::new(),
        };
        let now_us = db::now_us();
        let task = query::insert_task(
            &tx,
            title,
            new.description.as_deref(),
            new.due_at_us,
            actor,
            now_us,
        )?;
        query::set_assignees(&tx, task.id, &assignees, now_us)?;
        tx.commit()?;

        info!(task = task.id, actor, "created task");
        Ok(task)
    }

    /// # Errors
    ///
    /// [`HierarchyError::TaskNotFound`] when no such task exists.
    pub fn get_task(&self, task_id: TaskId) -> Result<Task, HierarchyError> {
        load_task(&self.conn, task_id)
    }

    /// Current assignees of a task, ascending.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::TaskNotFound`] when no such task exists.
    pub fn get_assignees(&self, task_id: TaskId) -> Result<Vec<UserId>, HierarchyError> {
        load_task(&self.conn, task_id)?;
        Ok(query::get_assignees(&self.conn, task_id)?)
    }

    /// Change a task's status through the permission-checked path.
    ///
    /// Completing a task triggers cascading completion of its ancestors
    /// (unless `hierarchy.auto_complete` is off). The cascade's outcome is
    /// reported, never returned as an error.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::TaskNotFound`]
    /// - [`HierarchyError::Forbidden`] unless the actor created the task, is
    ///   assigned to it, or holds an elevated role
    #[instrument(skip(self))]
    pub fn update_status(
        &mut self,
        task_id: TaskId,
        status: TaskStatus,
        actor: UserId,
    ) -> Result<StatusUpdate, HierarchyError> {
        let tx = immediate(&mut self.conn)?;
        let task = write_status(&tx, &self.authorizer, task_id, status, actor, db::now_us())?;
        tx.commit()?;
        info!(task = task_id, %status, actor, "updated task status");

        let propagation = if status.is_terminal() && self.config.auto_complete {
            self.propagate(task_id, actor)
        } else {
            PropagationReport::default()
        };

        Ok(StatusUpdate { task, propagation })
    }

    /// Replace a task's assignee set. An empty list leaves it unchanged.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::TaskNotFound`]
    /// - [`HierarchyError::Forbidden`] unless creator or elevated
    /// - [`HierarchyError::UserNotFound`] for an unknown user id
    #[instrument(skip(self))]
    pub fn assign_users(
        &mut self,
        task_id: TaskId,
        user_ids: &[UserId],
        actor: UserId,
    ) -> Result<Vec<UserId>, HierarchyError> {
        let tx = immediate(&mut self.conn)?;
        let task = load_task(&tx, task_id)?;
        let user = load_actor(&tx, actor, Action::Assign)?;
        ensure(self.authorizer.can_assign(&user, &task), actor, Action::Assign)?;

        if user_ids.is_empty() {
            return Ok(query::get_assignees(&tx, task_id)?);
        }

        let mut assignees = existing_users(&tx, user_ids)?;
        query::set_assignees(&tx, task_id, &assignees, db::now_us())?;
        tx.commit()?;

        assignees.sort_unstable();
        info!(task = task_id, count = assignees.len(), "replaced assignees");
        Ok(assignees)
    }

    /// Delete a task with its assignments and every hierarchy edge touching
    /// it.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::TaskNotFound`]
    /// - [`HierarchyError::Forbidden`] unless creator or elevated
    #[instrument(skip(self))]
    pub fn delete_task(&mut self, task_id: TaskId, actor: UserId) -> Result<(), HierarchyError> {
        let tx = immediate(&mut self.conn)?;
        let task = load_task(&tx, task_id)?;
        let user = load_actor(&tx, actor, Action::Delete)?;
        ensure(self.authorizer.can_delete(&user, &task), actor, Action::Delete)?;

        let unassigned = query::remove_assignments_for_task(&tx, task_id)?;
        let unlinked = edges::remove_edges_for_task(&tx, task_id)?;
        query::delete_task(&tx, task_id)?;
        tx.commit()?;

        info!(task = task_id, unassigned, unlinked, "deleted task");
        Ok(())
    }

    /// # Errors
    ///
    /// Store failures only.
    pub fn task_stats(&self) -> Result<TaskStats, HierarchyError> {
        let counts = query::count_tasks_by_status(&self.conn)?;
        let count = |status: TaskStatus| counts.get(&status).copied().unwrap_or(0);

        Ok(TaskStats {
            total: counts.values().sum(),
            open: count(TaskStatus::Open),
            in_progress: count(TaskStatus::InProgress),
            review: count(TaskStatus::Review),
            completed: count(TaskStatus::Completed),
        })
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Link `parent_id → child_id` after validating that the hierarchy
    /// stays acyclic. Re-linking an existing pair returns the stored edge
    /// (or fails with `DuplicateEdge` under `hierarchy.strict_edges`).
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::TaskNotFound`] if either task is missing
    /// - [`HierarchyError::InvalidSelfReference`] when both ids are equal
    /// - [`HierarchyError::Forbidden`] unless the actor created either task
    ///   or holds an elevated role
    /// - [`HierarchyError::CyclicRelationship`] when `child_id` is already
    ///   an ancestor of `parent_id`
    #[instrument(skip(self))]
    pub fn create_hierarchy(
        &mut self,
        parent_id: TaskId,
        child_id: TaskId,
        actor: UserId,
    ) -> Result<HierarchyEdge, HierarchyError> {
        let mode = EdgeMode::from_strict(self.config.strict_edges);

        let tx = immediate(&mut self.conn)?;
        let parent = load_task(&tx, parent_id)?;
        let child = load_task(&tx, child_id)?;
        if parent_id == child_id {
            return Err(HierarchyError::InvalidSelfReference(parent_id));
        }
        let user = load_actor(&tx, actor, Action::Link)?;
        ensure(self.authorizer.can_link(&user, &parent, &child), actor, Action::Link)?;

        let outcome = link_validated(&tx, parent_id, child_id, mode, db::now_us())?;
        tx.commit()?;

        match outcome {
            AddEdgeOutcome::Created(edge) => {
                info!(parent = parent_id, child = child_id, edge = edge.edge_id, "linked tasks");
            }
            AddEdgeOutcome::Existing(edge) => {
                debug!(parent = parent_id, child = child_id, edge = edge.edge_id, "link already present");
            }
        }
        Ok(outcome.edge())
    }

    /// Create a task and link it under `parent_id` in one transaction.
    ///
    /// Without explicit assignees the subtask copies the parent's current
    /// assignee set. Nothing is persisted unless both the task and the edge
    /// are.
    ///
    /// # Errors
    ///
    /// The errors of [`Self::create_task`] and [`Self::create_hierarchy`],
    /// plus [`HierarchyError::Internal`] if the fresh task somehow already
    /// has an edge from `parent_id`.
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub fn create_subtask(
        &mut self,
        parent_id: TaskId,
        new: &NewTask,
        actor: UserId,
    ) -> Result<Subtask, HierarchyError> {
        let title = require_title(new)?;
        let mode = EdgeMode::from_strict(self.config.strict_edges);

        let tx = immediate(&mut self.conn)?;
        let parent = load_task(&tx, parent_id)?;
        let user = load_actor(&tx, actor, Action::CreateTask)?;
        ensure(self.authorizer.can_create_task(&user), actor, Action::CreateTask)?;

        let assignees = match &new.assignees {
            Some(ids) => existing_users(&tx, ids)?,
            None => query::get_assignees(&tx, parent_id)?,
        };
        let now_us = db::now_us();
        let task = query::insert_task(
            &tx,
            title,
            new.description.as_deref(),
            new.due_at_us,
            actor,
            now_us,
        )?;
        query::set_assignees(&tx, task.id, &assignees, now_us)?;

        ensure(self.authorizer.can_link(&user, &parent, &task), actor, Action::Link)?;
        let outcome = match link_validated(&tx, parent_id, task.id, mode, now_us) {
            Ok(AddEdgeOutcome::Created(edge)) => edge,
            Ok(AddEdgeOutcome::Existing(_)) | Err(HierarchyError::DuplicateEdge { .. }) => {
                return Err(HierarchyError::Internal(format!(
                    "duplicate subtask creation: task {} already linked under {parent_id}",
                    task.id
                )));
            }
            Err(error) => return Err(error),
        };
        tx.commit()?;

        info!(parent = parent_id, task = task.id, "created subtask");
        Ok(Subtask {
            task,
            edge: outcome,
            assignees,
        })
    }

    /// The task with its immediate parents and children.
    ///
    /// # Errors
    ///
    /// [`HierarchyError::TaskNotFound`] when no such task exists.
    pub fn get_hierarchy(&self, task_id: TaskId) -> Result<TaskHierarchy, HierarchyError> {
        let task = load_task(&self.conn, task_id)?;
        let parents = load_distinct(
            &self.conn,
            edges::edges_by_child(&self.conn, task_id)?
                .into_iter()
                .map(|edge| edge.parent_id),
        )?;
        let children = load_distinct(
            &self.conn,
            edges::edges_by_parent(&self.conn, task_id)?
                .into_iter()
                .map(|edge| edge.child_id),
        )?;

        Ok(TaskHierarchy {
            task,
            parents,
            children,
        })
    }

    /// Unlink `parent_id → child_id`. Returns `false` when they were not
    /// linked.
    ///
    /// # Errors
    ///
    /// - [`HierarchyError::TaskNotFound`] if either task is missing
    /// - [`HierarchyError::Forbidden`] under the same rule as linking
    #[instrument(skip(self))]
    pub fn remove_hierarchy(
        &mut self,
        parent_id: TaskId,
        child_id: TaskId,
        actor: UserId,
    ) -> Result<bool, HierarchyError> {
        let tx = immediate(&mut self.conn)?;
        let parent = load_task(&tx, parent_id)?;
        let child = load_task(&tx, child_id)?;
        let user = load_actor(&tx, actor, Action::Unlink)?;
        ensure(self.authorizer.can_link(&user, &parent, &child), actor, Action::Unlink)?;

        let removed = edges::remove_edge(&tx, parent_id, child_id)?;
        tx.commit()?;

        if removed {
            info!(parent = parent_id, child = child_id, "unlinked tasks");
        }
        Ok(removed)
    }

    /// Re-check the whole stored hierarchy.
    ///
    /// # Errors
    ///
    /// Store failures only.
    pub fn verify_hierarchy(&self) -> Result<IntegrityReport, HierarchyError> {
        Ok(integrity::verify(&self.conn)?)
    }

    fn propagate(&mut self, task_id: TaskId, actor: UserId) -> PropagationReport {
        match self.try_propagate(task_id, actor) {
            Ok(report) => report,
            Err(error) => {
                warn!(task = task_id, %error, "cascading completion failed; child update kept");
                PropagationReport::default()
            }
        }
    }

    fn try_propagate(
        &mut self,
        task_id: TaskId,
        actor: UserId,
    ) -> Result<PropagationReport, HierarchyError> {
        let tx = immediate(&mut self.conn)?;
        let report = {
            let mut target = StoreCompletion {
                conn: &tx,
                authorizer: &self.authorizer,
                actor,
                now_us: db::now_us(),
            };
            propagate_completion(&mut target, task_id)?
        };
        tx.commit()?;
        Ok(report)
    }
}

/// Cascade host over one open transaction.
struct StoreCompletion<'a, A: ?Sized> {
    conn: &'a Connection,
    authorizer: &'a A,
    actor: UserId,
    now_us: i64,
}

impl<A: Authorizer + ?Sized> CompletionTarget for StoreCompletion<'_, A> {
    fn parent_ids(&self, task: TaskId) -> Result<Vec<TaskId>, HierarchyError> {
        Ok(edges::edges_by_child(self.conn, task)?
            .into_iter()
            .map(|edge| edge.parent_id)
            .collect())
    }

    fn child_statuses(&self, parent: TaskId) -> Result<Vec<TaskStatus>, HierarchyError> {
        edges::edges_by_parent(self.conn, parent)?
            .into_iter()
            .map(|edge| load_task(self.conn, edge.child_id).map(|task| task.status))
            .collect()
    }

    fn status_of(&self, task: TaskId) -> Result<TaskStatus, HierarchyError> {
        load_task(self.conn, task).map(|task| task.status)
    }

    fn mark_completed(&mut self, task: TaskId) -> Result<(), HierarchyError> {
        write_status(
            self.conn,
            self.authorizer,
            task,
            TaskStatus::Completed,
            self.actor,
            self.now_us,
        )
        .map(drop)
    }
}

fn immediate(conn: &mut Connection) -> Result<Transaction<'_>, HierarchyError> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

fn require_title(new: &NewTask) -> Result<&str, HierarchyError> {
    new.normalized_title()
        .ok_or_else(|| HierarchyError::InvalidInput("title must not be blank".into()))
}

fn load_task(conn: &Connection, task_id: TaskId) -> Result<Task, HierarchyError> {
    query::get_task(conn, task_id)?.ok_or(HierarchyError::TaskNotFound(task_id))
}

/// Unknown actors are never authorized.
fn load_actor(conn: &Connection, actor: UserId, action: Action) -> Result<User, HierarchyError> {
    query::get_user(conn, actor)?.ok_or(HierarchyError::Forbidden { actor, action })
}

const fn ensure(allowed: bool, actor: UserId, action: Action) -> Result<(), HierarchyError> {
    if allowed {
        Ok(())
    } else {
        Err(HierarchyError::Forbidden { actor, action })
    }
}

/// Dedup `ids` (first occurrence wins) and check every user exists.
fn existing_users(conn: &Connection, ids: &[UserId]) -> Result<Vec<UserId>, HierarchyError> {
    let mut seen = HashSet::new();
    let mut users = Vec::with_capacity(ids.len());
    for &id in ids {
        if !seen.insert(id) {
            continue;
        }
        if query::get_user(conn, id)?.is_none() {
            return Err(HierarchyError::UserNotFound(id));
        }
        users.push(id);
    }
    Ok(users)
}

fn load_distinct(
    conn: &Connection,
    ids: impl IntoIterator<Item = TaskId>,
) -> Result<Vec<Task>, HierarchyError> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| load_task(conn, id))
        .collect()
}

fn link_validated(
    conn: &Connection,
    parent: TaskId,
    child: TaskId,
    mode: EdgeMode,
    now_us: i64,
) -> Result<AddEdgeOutcome, HierarchyError> {
    if let Some(violation) = check_edge(conn, parent, child)? {
        return Err(violation_error(violation));
    }
    edges::add_edge(conn, parent, child, mode, now_us)
}

fn violation_error(violation: CycleViolation) -> HierarchyError {
    if violation.is_self_loop() {
        HierarchyError::InvalidSelfReference(violation.edge_from)
    } else {
        HierarchyError::CyclicRelationship {
            parent: violation.edge_from,
            child: violation.edge_to,
            path: violation.cycle_path,
        }
    }
}

/// The single permission-checked status write, shared by direct updates
/// and cascading completion.
fn write_status<A: Authorizer + ?Sized>(
    conn: &Connection,
    authorizer: &A,
    task_id: TaskId,
    status: TaskStatus,
    actor: UserId,
    now_us: i64,
) -> Result<Task, HierarchyError> {
    let task = load_task(conn, task_id)?;
    let user = load_actor(conn, actor, Action::UpdateStatus)?;
    let assignees = query::get_assignees(conn, task_id)?;
    ensure(
        authorizer.can_update_status(&user, &task, &assignees),
        actor,
        Action::UpdateStatus,
    )?;

    query::update_task_status(conn, task_id, status, now_us)?;
    Ok(Task {
        status,
        updated_at_us: now_us,
        ..task
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HierarchyService {
        HierarchyService::in_memory().expect("in-memory service")
    }

    #[test]
    fn blank_username_and_title_are_rejected() {
        let mut svc = service();
        assert!(matches!(
            svc.create_user("  ", None, UserRole::User),
            Err(HierarchyError::InvalidInput(_))
        ));

        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        assert!(matches!(
            svc.create_task(&NewTask::new(" \t"), ann.id),
            Err(HierarchyError::InvalidInput(_))
        ));
    }

    #[test]
    fn duplicate_username_is_invalid_input() {
        let mut svc = service();
        svc.create_user("ann", None, UserRole::User).unwrap();
        let err = svc.create_user(" ann ", None, UserRole::Admin).unwrap_err();
        assert!(err.to_string().contains("already taken"));
    }

    #[test]
    fn unknown_actor_is_forbidden() {
        let mut svc = service();
        let err = svc.create_task(&NewTask::new("t"), 77).unwrap_err();
        assert!(matches!(
            err,
            HierarchyError::Forbidden {
                actor: 77,
                action: Action::CreateTask
            }
        ));
    }

    #[test]
    fn create_task_trims_title_and_sets_assignees() {
        let mut svc = service();
        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        let bob = svc.create_user("bob", None, UserRole::User).unwrap();

        let task = svc
            .create_task(
                &NewTask::new("  Plan  ").with_assignees(vec![bob.id, bob.id]),
                ann.id,
            )
            .unwrap();
        assert_eq!(task.title, "Plan");
        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.creator_id, ann.id);
        assert_eq!(svc.get_assignees(task.id).unwrap(), vec![bob.id]);
    }

    #[test]
    fn unknown_assignee_rolls_back_task() {
        let mut svc = service();
        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        let err = svc
            .create_task(&NewTask::new("t").with_assignees(vec![404]), ann.id)
            .unwrap_err();
        assert!(matches!(err, HierarchyError::UserNotFound(404)));
        assert_eq!(svc.task_stats().unwrap().total, 0);
    }

    #[test]
    fn strict_edges_reject_relink() {
        let conn = db::open_in_memory().unwrap();
        let mut svc = HierarchyService::new(
            conn,
            HierarchyConfig {
                strict_edges: true,
                auto_complete: true,
            },
        );
        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        let a = svc.create_task(&NewTask::new("a"), ann.id).unwrap();
        let b = svc.create_task(&NewTask::new("b"), ann.id).unwrap();

        svc.create_hierarchy(a.id, b.id, ann.id).unwrap();
        let err = svc.create_hierarchy(a.id, b.id, ann.id).unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::DuplicateEdge);
    }

    #[test]
    fn auto_complete_can_be_disabled() {
        let conn = db::open_in_memory().unwrap();
        let mut svc = HierarchyService::new(
            conn,
            HierarchyConfig {
                strict_edges: false,
                auto_complete: false,
            },
        );
        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        let parent = svc.create_task(&NewTask::new("p"), ann.id).unwrap();
        let child = svc
            .create_subtask(parent.id, &NewTask::new("c"), ann.id)
            .unwrap();

        let update = svc
            .update_status(child.task.id, TaskStatus::Completed, ann.id)
            .unwrap();
        assert!(update.propagation.is_empty());
        assert_eq!(svc.get_task(parent.id).unwrap().status, TaskStatus::Open);
    }

    #[test]
    fn stats_count_every_status() {
        let mut svc = service();
        let ann = svc.create_user("ann", None, UserRole::User).unwrap();
        let a = svc.create_task(&NewTask::new("a"), ann.id).unwrap();
        let b = svc.create_task(&NewTask::new("b"), ann.id).unwrap();
        svc.create_task(&NewTask::new("c"), ann.id).unwrap();
        svc.update_status(a.id, TaskStatus::Review, ann.id).unwrap();
        svc.update_status(b.id, TaskStatus::InProgress, ann.id).unwrap();

        assert_eq!(
            svc.task_stats().unwrap(),
            TaskStats {
                total: 3,
                open: 1,
                in_progress: 1,
                review: 1,
                completed: 0,
            }
        );
    }
}
