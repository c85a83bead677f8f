//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint store backends and
//! associated error types.

use crate::state::ItemState;
use crate::storage::{ItemRecord, RunRecord, RunStatus};
use crate::AppId;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint store implementations
///
/// The store maps every identifier to the last state it reached, and records
/// each crawl run so an interrupted run can be told apart from a finished one.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Item Management =====

    /// Gets the checkpoint record for an identifier, if one exists
    fn get_item(&self, appid: AppId) -> StorageResult<Option<ItemRecord>>;

    /// Inserts or replaces the checkpoint record for an identifier
    ///
    /// # Arguments
    ///
    /// * `appid` - The identifier
    /// * `state` - The state it reached
    /// * `run_id` - The run that moved it there
    /// * `kind` - Detail type tag, when known
    /// * `attempts` - Network attempts spent on it in this run
    /// * `message` - Diagnostic for skipped or failed items
    fn set_item_state(
        &mut self,
        appid: AppId,
        state: ItemState,
        run_id: i64,
        kind: Option<&str>,
        attempts: u32,
        message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets all items in a specific state, ordered by identifier
    fn get_items_by_state(&self, state: ItemState) -> StorageResult<Vec<ItemRecord>>;

    /// Removes every item record (used by fresh crawls)
    fn clear_items(&mut self) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts items in a specific state
    fn count_items_by_state(&self, state: ItemState) -> StorageResult<u64>;

    /// Counts all tracked items
    fn count_total_items(&self) -> StorageResult<u64>;
}
