//! SQLite checkpoint store
//!
//! Writes go straight to disk in WAL mode, so every state change survives an
//! abrupt stop of the process.

use crate::state::ItemState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ItemRecord, RunRecord, RunStatus};
use crate::{AppId, HarvestError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const ITEM_COLUMNS: &str = "appid, state, kind, attempts, message, run_id, updated_at";
const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the checkpoint database at `path`
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ItemRecord> {
    Ok(ItemRecord {
        appid: row.get(0)?,
        // An unreadable state is fetched again rather than trusted.
        state: ItemState::from_db_string(&row.get::<_, String>(1)?).unwrap_or(ItemState::Pending),
        kind: row.get(2)?,
        attempts: row.get(3)?,
        message: row.get(4)?,
        run_id: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![
                RunStatus::Completed.to_db_string(),
                Utc::now().to_rfc3339(),
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Item Management =====

    fn get_item(&self, appid: AppId) -> StorageResult<Option<ItemRecord>> {
        let item = self
            .conn
            .query_row(
                &format!("SELECT {} FROM items WHERE appid = ?1", ITEM_COLUMNS),
                params![appid],
                item_from_row,
            )
            .optional()?;

        Ok(item)
    }

    fn set_item_state(
        &mut self,
        appid: AppId,
        state: ItemState,
        run_id: i64,
        kind: Option<&str>,
        attempts: u32,
        message: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO items (appid, state, kind, attempts, message, run_id, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(appid) DO UPDATE SET
                state = excluded.state,
                kind = COALESCE(excluded.kind, items.kind),
                attempts = excluded.attempts,
                message = excluded.message,
                run_id = excluded.run_id,
                updated_at = excluded.updated_at",
            params![
                appid,
                state.to_db_string(),
                kind,
                attempts,
                message,
                run_id,
                now
            ],
        )?;
        Ok(())
    }

    fn get_items_by_state(&self, state: ItemState) -> StorageResult<Vec<ItemRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM items WHERE state = ?1 ORDER BY appid",
            ITEM_COLUMNS
        ))?;

        let items = stmt
            .query_map(params![state.to_db_string()], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn clear_items(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM items", [])?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_items_by_state(&self, state: ItemState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
