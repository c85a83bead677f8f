//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the checkpoint store.

/// Checkpoint store tables
pub const SCHEMA_SQL: &str = r#"
-- One row per invocation
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Latest known state of every identifier
CREATE TABLE IF NOT EXISTS items (
    appid INTEGER PRIMARY KEY,
    state TEXT NOT NULL,
    kind TEXT,
    attempts INTEGER NOT NULL DEFAULT 0,
    message TEXT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_state ON items(state);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
