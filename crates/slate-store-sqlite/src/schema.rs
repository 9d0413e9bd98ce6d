//! SQL schema for the Slate SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The UNIQUE constraints are load-bearing: the service layer checks
/// uniqueness before writing, and these close the window between the check
/// and the write under concurrent requests.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- opaque PHC string; never interpreted here
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE,
    instructor TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Classes live and die with their subject; updates replace the whole set.
CREATE TABLE IF NOT EXISTS classes (
    class_id   TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL REFERENCES subjects(subject_id),
    day        INTEGER NOT NULL,   -- 1 = Monday … 5 = Friday
    block      INTEGER NOT NULL,   -- 1 = 08:00 … 6 = 21:00
    classroom  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    schedule_id TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id),
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

-- Many-to-many membership; rows reference, never own, subjects.
CREATE TABLE IF NOT EXISTS schedule_subjects (
    schedule_id TEXT NOT NULL REFERENCES schedules(schedule_id),
    subject_id  TEXT NOT NULL REFERENCES subjects(subject_id),
    added_at    TEXT NOT NULL,
    PRIMARY KEY (schedule_id, subject_id)
);

CREATE INDEX IF NOT EXISTS classes_subject_idx    ON classes(subject_id);
CREATE INDEX IF NOT EXISTS classes_day_idx        ON classes(day);
CREATE INDEX IF NOT EXISTS classes_block_idx      ON classes(block);
CREATE INDEX IF NOT EXISTS schedules_owner_idx    ON schedules(owner_id);
CREATE INDEX IF NOT EXISTS memberships_subject_idx ON schedule_subjects(subject_id);

PRAGMA user_version = 1;
";
