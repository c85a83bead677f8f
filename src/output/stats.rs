//! Statistics generation from the checkpoint store
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::ItemState;
use crate::storage::{RunRecord, Storage};
use crate::{AppId, HarvestError};
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// Total number of identifiers tracked
    pub total_items: u64,

    /// Count of items by state
    pub items_by_state: HashMap<ItemState, u64>,

    /// Identifiers that exhausted their retries
    pub exhausted: Vec<AppId>,
}

impl CrawlStatistics {
    pub fn count(&self, state: ItemState) -> u64 {
        self.items_by_state.get(&state).copied().unwrap_or(0)
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, HarvestError> {
    let latest_run = storage.get_latest_run()?;
    let total_items = storage.count_total_items()?;

    let mut items_by_state = HashMap::new();
    for state in ItemState::all_states() {
        let count = storage.count_items_by_state(state)?;
        if count > 0 {
            items_by_state.insert(state, count);
        }
    }

    let exhausted = storage
        .get_items_by_state(ItemState::ExhaustedRetries)?
        .into_iter()
        .map(|item| item.appid)
        .collect();

    Ok(CrawlStatistics {
        latest_run,
        total_items,
        items_by_state,
        exhausted,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    match &stats.latest_run {
        Some(run) => {
            println!("Latest run:");
            println!("  Run ID: {}", run.id);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!("  Status: {}", run.status.to_db_string());
            println!("  Config hash: {}", run.config_hash);
        }
        None => println!("No runs recorded yet."),
    }
    println!();

    println!("Items by State:");
    for state in ItemState::all_states() {
        let count = stats.count(state);
        let percentage = if stats.total_items > 0 {
            (count as f64 / stats.total_items as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.exhausted.is_empty() {
        println!("Exhausted retries ({}):", stats.exhausted.len());
        for appid in stats.exhausted.iter().take(20) {
            println!("  - {}", appid);
        }
        if stats.exhausted.len() > 20 {
            println!("  ... and {} more", stats.exhausted.len() - 20);
        }
        println!();
    }

    println!(
        "Routed: {} / {} tracked identifiers",
        stats.count(ItemState::Routed),
        stats.total_items
    );
}
