//! Output module for crawl results
//!
//! This module handles:
//! - Appending routed records to the flat output tables
//! - The processed and permanent-failure identifier logs
//! - Reporting crawl statistics from the checkpoint store

mod log;
mod records;
pub mod stats;
mod table;

pub use log::AppendLog;
pub use records::{BaseGameRow, DemoRow, DlcRow, PLACEHOLDER};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use table::TableSink;

use crate::config::OutputConfig;

/// The three output tables of a detail crawl
#[derive(Debug, Clone)]
pub struct OutputTables {
    pub base_games: TableSink<BaseGameRow>,
    pub dlcs: TableSink<DlcRow>,
    pub demos: TableSink<DemoRow>,
}

impl OutputTables {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            base_games: TableSink::new(&config.base_games_path),
            dlcs: TableSink::new(&config.dlcs_path),
            demos: TableSink::new(&config.demos_path),
        }
    }
}
