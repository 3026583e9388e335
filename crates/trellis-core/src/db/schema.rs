//! Canonical SQLite schema for the trellis task store.
//!
//! - `users` and `tasks` hold the aggregate rows
//! - `task_hierarchy` holds parent → child edges; `edge_id` doubles as the
//!   insertion order used for deterministic traversal
//! - `task_assignments` is the many-to-many task/user registry
//! - `store_meta` tracks the applied schema version

/// Migration v1: core tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE CHECK (length(trim(username)) > 0),
    full_name TEXT,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'manager', 'user')),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    task_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    due_at_us INTEGER,
    status TEXT NOT NULL DEFAULT 'open'
        CHECK (status IN ('open', 'in_progress', 'review', 'completed')),
    creator_id INTEGER NOT NULL REFERENCES users(user_id),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS task_hierarchy (
    edge_id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id INTEGER NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    child_id INTEGER NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    created_at_us INTEGER NOT NULL,
    UNIQUE (parent_id, child_id),
    CHECK (parent_id <> child_id)
);

CREATE TABLE IF NOT EXISTS task_assignments (
    task_id INTEGER NOT NULL REFERENCES tasks(task_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    assigned_at_us INTEGER NOT NULL,
    PRIMARY KEY (task_id, user_id)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: read-path indexes for hierarchy traversal and listings.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_task_hierarchy_child
    ON task_hierarchy(child_id, edge_id);

CREATE INDEX IF NOT EXISTS idx_task_hierarchy_parent
    ON task_hierarchy(parent_id, edge_id);

CREATE INDEX IF NOT EXISTS idx_task_assignments_user
    ON task_assignments(user_id, task_id);

CREATE INDEX IF NOT EXISTS idx_tasks_status_updated
    ON tasks(status, updated_at_us DESC);

CREATE INDEX IF NOT EXISTS idx_tasks_creator
    ON tasks(creator_id);
";

/// Indexes expected by hierarchy and listing query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_task_hierarchy_child",
    "idx_task_hierarchy_parent",
    "idx_task_assignments_user",
    "idx_tasks_status_updated",
    "idx_tasks_creator",
];
