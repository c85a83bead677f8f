//! Crawler module for store detail harvesting
//!
//! This module contains the core crawling logic, including:
//! - Decoding detail responses into typed records
//! - HTTP fetching with retry logic and request rate limiting
//! - Overall crawl coordination
//! - The catalog listing job

mod catalog;
mod coordinator;
mod fetcher;
mod limiter;
mod parser;

pub use catalog::{fetch_app_list, write_app_list, AppListEntry};
pub use coordinator::{run_crawl, Coordinator, RunOptions, RunSummary};
pub use fetcher::{build_http_client, DetailFetcher, FetchOutcome, FetchReport};
pub use limiter::RateLimiter;
pub use parser::{parse_detail_response, DetailLookup, DetailRecord, GameDetails, LinkDetails};

use crate::config::Config;
use crate::{AppId, HarvestError};
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the checkpoint store and record a new run
/// 2. Build the HTTP client
/// 3. Fetch and route every identifier not yet finished
/// 4. Mark the run completed
///
/// # Returns
///
/// * `Ok(RunSummary)` - Outcome counts for this run
/// * `Err(HarvestError)` - The checkpoint store or HTTP client could not be set up
pub async fn crawl(
    config: Config,
    config_hash: &str,
    options: RunOptions,
    appids: &[AppId],
) -> Result<RunSummary, HarvestError> {
    run_crawl(config, config_hash, options, appids).await
}

/// Downloads the catalog listing and writes it to the configured path
///
/// Returns the number of entries written.
pub async fn harvest_app_list(config: &Config) -> Result<usize, HarvestError> {
    let client = build_http_client(&config.user_agent, config.api.request_timeout())?;

    tracing::info!("Fetching app list from {}", config.api.app_list_url);
    let entries = fetch_app_list(&client, &config.api.app_list_url).await?;

    let path = Path::new(&config.output.app_list_path);
    write_app_list(path, &entries)?;
    tracing::info!("Saved {} apps to {}", entries.len(), path.display());

    Ok(entries.len())
}
