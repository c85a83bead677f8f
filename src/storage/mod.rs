//! Storage module for the crawl checkpoint store
//!
//! One row per crawl run and one row per app id. An id whose row holds a
//! terminal state is skipped by later runs.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::ItemState;
use crate::AppId;

/// Represents one identifier in the checkpoint store
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub appid: AppId,
    pub state: ItemState,
    pub kind: Option<String>,
    pub attempts: u32,
    pub message: Option<String>,
    pub run_id: i64,
    pub updated_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Lifecycle of a crawl run
///
/// A run stays `Running` until its loop finishes. If the process dies first, the
/// next run finds it still `Running` and marks it `Interrupted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        [Self::Running, Self::Completed, Self::Interrupted]
            .into_iter()
            .find(|status| status.to_db_string() == s)
    }
}
