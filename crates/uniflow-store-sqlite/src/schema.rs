//! SQL schema for the UniFlow SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    name        TEXT,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC, fixed width
);

-- `groups` is an SQL keyword.
CREATE TABLE IF NOT EXISTS study_groups (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS group_members (
    group_id  INTEGER NOT NULL REFERENCES study_groups(id) ON DELETE CASCADE,
    user_id   INTEGER NOT NULL REFERENCES users(id)        ON DELETE CASCADE,
    PRIMARY KEY (group_id, user_id)
);

CREATE TABLE IF NOT EXISTS events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    notes       TEXT,
    start_time  TEXT NOT NULL,
    end_time    TEXT NOT NULL,     -- end_time >= start_time is not enforced
    user_id     INTEGER NOT NULL REFERENCES users(id),
    group_id    INTEGER REFERENCES study_groups(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    description  TEXT,
    deadline     TEXT NOT NULL,
    priority     TEXT NOT NULL CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH')),
    completed    INTEGER NOT NULL DEFAULT 0,
    user_id      INTEGER NOT NULL REFERENCES users(id),
    group_id     INTEGER REFERENCES study_groups(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS events_start_idx    ON events(start_time);
CREATE INDEX IF NOT EXISTS tasks_deadline_idx  ON tasks(deadline);
CREATE INDEX IF NOT EXISTS group_members_user  ON group_members(user_id);

PRAGMA user_version = 1;
";
