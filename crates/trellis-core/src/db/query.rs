//! `SQLite` query helpers for users, tasks, and assignments.
//!
//! All functions take a shared `&Connection` (a `Transaction` derefs to one)
//! and return `anyhow::Result<T>` with typed structs, never raw rows.
//! Hierarchy edges live in [`crate::graph::edges`].

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params, types::Type};
use std::collections::HashMap;
use std::str::FromStr;

use crate::model::{Task, TaskId, TaskStatus, User, UserId, UserRole};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user row and return it.
///
/// # Errors
///
/// Returns an error if the insert fails (including a duplicate username).
pub fn insert_user(
    conn: &Connection,
    username: &str,
    full_name: Option<&str>,
    role: UserRole,
    now_us: i64,
) -> Result<User> {
    conn.execute(
        "INSERT INTO users (username, full_name, role, created_at_us) VALUES (?1, ?2, ?3, ?4)",
        params![username, full_name, role.as_str(), now_us],
    )
    .with_context(|| format!("insert user '{username}'"))?;

    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        full_name: full_name.map(str::to_string),
        role,
        created_at_us: now_us,
    })
}

/// Fetch a user by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_user(conn: &Connection, user_id: UserId) -> Result<Option<User>> {
    conn.query_row(
        "SELECT user_id, username, full_name, role, created_at_us FROM users WHERE user_id = ?1",
        params![user_id],
        row_to_user,
    )
    .optional()
    .with_context(|| format!("get_user for {user_id}"))
}

/// Fetch a user by exact username.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT user_id, username, full_name, role, created_at_us FROM users WHERE username = ?1",
        params![username],
        row_to_user,
    )
    .optional()
    .with_context(|| format!("find_user_by_username for '{username}'"))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Insert an OPEN task row and return it.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_task(
    conn: &Connection,
    title: &str,
    description: Option<&str>,
    due_at_us: Option<i64>,
    creator_id: UserId,
    now_us: i64,
) -> Result<Task> {
    let status = TaskStatus::Open;
    conn.execute(
        "INSERT INTO tasks (title, description, due_at_us, status, creator_id, \
         created_at_us, updated_at_us) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![title, description, due_at_us, status.as_str(), creator_id, now_us],
    )
    .with_context(|| format!("insert task '{title}'"))?;

    Ok(Task {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        description: description.map(str::to_string),
        due_at_us,
        status,
        creator_id,
        created_at_us: now_us,
        updated_at_us: now_us,
    })
}

/// Fetch a task by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_task(conn: &Connection, task_id: TaskId) -> Result<Option<Task>> {
    conn.query_row(
        "SELECT task_id, title, description, due_at_us, status, creator_id, \
         created_at_us, updated_at_us FROM tasks WHERE task_id = ?1",
        params![task_id],
        row_to_task,
    )
    .optional()
    .with_context(|| format!("get_task for {task_id}"))
}

/// Ids of tasks whose title matches exactly, ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn task_ids_with_title(conn: &Connection, title: &str) -> Result<Vec<TaskId>> {
    collect_ids(
        conn,
        "SELECT task_id FROM tasks WHERE title = ?1 ORDER BY task_id",
        params![title],
    )
    .with_context(|| format!("task_ids_with_title for '{title}'"))
}

/// Every task id, ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_task_ids(conn: &Connection) -> Result<Vec<TaskId>> {
    collect_ids(conn, "SELECT task_id FROM tasks ORDER BY task_id", [])
        .context("list_task_ids")
}

/// Overwrite a task's status. Returns `false` when the task does not exist.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_task_status(
    conn: &Connection,
    task_id: TaskId,
    status: TaskStatus,
    now_us: i64,
) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE tasks SET status = ?1, updated_at_us = ?2 WHERE task_id = ?3",
            params![status.as_str(), now_us, task_id],
        )
        .with_context(|| format!("update status of task {task_id}"))?;
    Ok(changed > 0)
}

/// Delete a task row. Returns `false` when the task does not exist.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_task(conn: &Connection, task_id: TaskId) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM tasks WHERE task_id = ?1", params![task_id])
        .with_context(|| format!("delete task {task_id}"))?;
    Ok(changed > 0)
}

/// Task counts keyed by status. Statuses with no tasks are absent.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_tasks_by_status(conn: &Connection) -> Result<HashMap<TaskStatus, usize>> {
    let mut stmt = conn
        .prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")
        .context("prepare count_tasks_by_status")?;
    let rows = stmt
        .query_map([], |row| {
            let status = parse_column::<TaskStatus>(row, 0)?;
            let count: i64 = row.get(1)?;
            Ok((status, usize::try_from(count).unwrap_or(0)))
        })
        .context("execute count_tasks_by_status")?;

    let mut counts = HashMap::new();
    for row in rows {
        let (status, count) = row.context("read status count row")?;
        counts.insert(status, count);
    }
    Ok(counts)
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

/// Assigned user ids for a task, ascending.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_assignees(conn: &Connection, task_id: TaskId) -> Result<Vec<UserId>> {
    collect_ids(
        conn,
        "SELECT user_id FROM task_assignments WHERE task_id = ?1 ORDER BY user_id",
        params![task_id],
    )
    .with_context(|| format!("get_assignees for task {task_id}"))
}

/// Replace a task's assignee set.
///
/// # Errors
///
/// Returns an error if any delete or insert fails.
pub fn set_assignees(
    conn: &Connection,
    task_id: TaskId,
    user_ids: &[UserId],
    now_us: i64,
) -> Result<()> {
    remove_assignments_for_task(conn, task_id)?;

    let mut stmt = conn
        .prepare(
            "INSERT OR IGNORE INTO task_assignments (task_id, user_id, assigned_at_us) \
             VALUES (?1, ?2, ?3)",
        )
        .context("prepare set_assignees")?;
    for user_id in user_ids {
        stmt.execute(params![task_id, user_id, now_us])
            .with_context(|| format!("assign user {user_id} to task {task_id}"))?;
    }
    Ok(())
}

/// Drop every assignment of a task.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn remove_assignments_for_task(conn: &Connection, task_id: TaskId) -> Result<usize> {
    conn.execute(
        "DELETE FROM task_assignments WHERE task_id = ?1",
        params![task_id],
    )
    .with_context(|| format!("remove assignments for task {task_id}"))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn collect_ids<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(sql).context("prepare id query")?;
    let rows = stmt
        .query_map(params, |row| row.get::<_, i64>(0))
        .context("execute id query")?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.context("read id row")?);
    }
    Ok(ids)
}

fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(error)))
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        role: parse_column(row, 3)?,
        created_at_us: row.get(4)?,
    })
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_at_us: row.get(3)?,
        status: parse_column(row, 4)?,
        creator_id: row.get(5)?,
        created_at_us: row.get(6)?,
        updated_at_us: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn test_db() -> Connection {
        open_in_memory().expect("in-memory store")
    }

    fn seed_user(conn: &Connection, name: &str) -> User {
        insert_user(conn, name, None, UserRole::User, 1).unwrap()
    }

    #[test]
    fn user_round_trip() {
        let conn = test_db();
        let inserted = insert_user(&conn, "ann", Some("Ann Lee"), UserRole::Manager, 42).unwrap();

        let fetched = get_user(&conn, inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(
            find_user_by_username(&conn, "ann").unwrap().map(|u| u.id),
            Some(inserted.id)
        );
        assert!(get_user(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let conn = test_db();
        seed_user(&conn, "ann");
        assert!(insert_user(&conn, "ann", None, UserRole::User, 2).is_err());
    }

    #[test]
    fn task_insert_and_status_update() {
        let conn = test_db();
        let owner = seed_user(&conn, "ann");
        let task = insert_task(&conn, "Write docs", Some("all of them"), Some(99), owner.id, 10)
            .unwrap();
        assert_eq!(task.status, TaskStatus::Open);

        assert!(update_task_status(&conn, task.id, TaskStatus::Review, 20).unwrap());
        let fetched = get_task(&conn, task.id).unwrap().unwrap();
        assert_eq!(fetched.status, TaskStatus::Review);
        assert_eq!(fetched.updated_at_us, 20);
        assert_eq!(fetched.created_at_us, 10);

        assert!(!update_task_status(&conn, 999, TaskStatus::Open, 30).unwrap());
    }

    #[test]
    fn missing_task_is_none() {
        let conn = test_db();
        assert!(get_task(&conn, 1).unwrap().is_none());
        assert!(!delete_task(&conn, 1).unwrap());
    }

    #[test]
    fn set_assignees_replaces_previous_set() {
        let conn = test_db();
        let ann = seed_user(&conn, "ann");
        let bob = seed_user(&conn, "bob");
        let cat = seed_user(&conn, "cat");
        let task = insert_task(&conn, "t", None, None, ann.id, 1).unwrap();

        set_assignees(&conn, task.id, &[cat.id, ann.id], 2).unwrap();
        assert_eq!(get_assignees(&conn, task.id).unwrap(), vec![ann.id, cat.id]);

        set_assignees(&conn, task.id, &[bob.id, bob.id], 3).unwrap();
        assert_eq!(get_assignees(&conn, task.id).unwrap(), vec![bob.id]);

        assert_eq!(remove_assignments_for_task(&conn, task.id).unwrap(), 1);
        assert!(get_assignees(&conn, task.id).unwrap().is_empty());
    }

    #[test]
    fn deleting_task_cascades_assignments() {
        let conn = test_db();
        let ann = seed_user(&conn, "ann");
        let task = insert_task(&conn, "t", None, None, ann.id, 1).unwrap();
        set_assignees(&conn, task.id, &[ann.id], 2).unwrap();

        assert!(delete_task(&conn, task.id).unwrap());
        let remaining: i64 = conn
            .query_row("SELECT COUNT(*) FROM task_assignments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn status_counts_group_by_status() {
        let conn = test_db();
        let ann = seed_user(&conn, "ann");
        for title in ["a", "b", "c"] {
            insert_task(&conn, title, None, None, ann.id, 1).unwrap();
        }
        let done = insert_task(&conn, "d", None, None, ann.id, 1).unwrap();
        update_task_status(&conn, done.id, TaskStatus::Completed, 2).unwrap();

        let counts = count_tasks_by_status(&conn).unwrap();
        assert_eq!(counts.get(&TaskStatus::Open), Some(&3));
        assert_eq!(counts.get(&TaskStatus::Completed), Some(&1));
        assert_eq!(counts.get(&TaskStatus::Review), None);
    }

    #[test]
    fn title_lookup_and_listing() {
        let conn = test_db();
        let ann = seed_user(&conn, "ann");
        let a = insert_task(&conn, "same", None, None, ann.id, 1).unwrap();
        let b = insert_task(&conn, "same", None, None, ann.id, 1).unwrap();
        let c = insert_task(&conn, "other", None, None, ann.id, 1).unwrap();

        assert_eq!(task_ids_with_title(&conn, "same").unwrap(), vec![a.id, b.id]);
        assert_eq!(list_task_ids(&conn).unwrap(), vec![a.id, b.id, c.id]);
    }
}
