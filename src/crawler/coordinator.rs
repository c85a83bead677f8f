//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives a detail crawl:
//! - Opening the checkpoint store and recording the run
//! - Skipping identifiers that already reached a terminal state
//! - Fetching each remaining identifier and routing its record to a table
//! - Recording every outcome in the logs and the checkpoint store

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, DetailFetcher, FetchOutcome};
use crate::crawler::parser::DetailRecord;
use crate::output::{AppendLog, BaseGameRow, DemoRow, DlcRow, OutputTables};
use crate::state::ItemState;
use crate::storage::{RunStatus, SqliteStorage, Storage};
use crate::{AppId, HarvestError};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

/// Checkpoint message of ids the store answered without data
const NO_DATA: &str = "no data";

/// How a run treats state left behind by earlier runs
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Forget every checkpoint and process all identifiers again
    pub fresh: bool,

    /// Fetch identifiers whose retries ran out, or that the store answered
    /// without data, in an earlier run again
    pub retry_failed: bool,
}

/// Per-run outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records written to an output table
    pub routed: usize,

    /// Answers that produced no record
    pub skipped: usize,

    /// Identifiers whose attempts all failed
    pub exhausted: usize,

    /// Records lost to an output write fault (left pending for a later run)
    pub write_failed: usize,

    /// Identifiers skipped because an earlier run (or an earlier row) finished them
    pub already_done: usize,
}

impl RunSummary {
    /// Identifiers this run actually looked up
    pub fn fetched(&self) -> usize {
        self.routed + self.skipped + self.exhausted + self.write_failed
    }
}

/// Where a fetched record ended up
enum Routing {
    Routed,
    Skipped(String),
    WriteFailed(HarvestError),
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    storage: SqliteStorage,
    fetcher: DetailFetcher,
    tables: OutputTables,
    processed_log: AppendLog,
    options: RunOptions,
    run_id: i64,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash recorded with the run
    /// * `options` - Fresh/resume behavior
    pub fn new(config: Config, config_hash: &str, options: RunOptions) -> Result<Self, HarvestError> {
        let mut storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path))?;

        if options.fresh {
            tracing::info!("Starting fresh crawl (clearing checkpoints)");
            storage.clear_items()?;
        }

        if let Some(latest_run) = storage.get_latest_run()? {
            if latest_run.status == RunStatus::Running {
                tracing::info!(
                    "Run {} did not finish; resuming from its checkpoints",
                    latest_run.id
                );
                storage.update_run_status(latest_run.id, RunStatus::Interrupted)?;
            }
        }

        let run_id = storage.create_run(config_hash)?;

        let client = build_http_client(&config.user_agent, config.api.request_timeout())?;
        let fetcher = DetailFetcher::new(
            client,
            &config.api,
            &config.crawler,
            AppendLog::new(&config.output.errored_log_path),
        )?;

        Ok(Self {
            tables: OutputTables::from_config(&config.output),
            processed_log: AppendLog::new(&config.output.processed_log_path),
            config,
            storage,
            fetcher,
            options,
            run_id,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Runs the crawl loop over `appids`, in order
    ///
    /// Individual failures never stop the loop. Only checkpoint store errors do.
    pub async fn run(&mut self, appids: &[AppId]) -> Result<RunSummary, HarvestError> {
        tracing::info!("Starting crawl run {}: {} app(s)", self.run_id, appids.len());

        let mut summary = RunSummary::default();
        let mut seen = HashSet::new();
        let start_time = Instant::now();
        let pacing = self.config.crawler.pacing_delay();

        for (idx, &appid) in appids.iter().enumerate() {
            if !seen.insert(appid) || self.is_done(appid)? {
                tracing::debug!("AppID {} already processed, skipping", appid);
                summary.already_done += 1;
                continue;
            }

            tracing::info!("Processing {}/{}: AppID {}", idx + 1, appids.len(), appid);
            self.process(appid, &mut summary).await?;

            let fetched = summary.fetched();
            if fetched % 10 == 0 {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {} fetched (at {}/{}), {} routed, {} exhausted, {:.2} apps/sec",
                    fetched,
                    idx + 1,
                    appids.len(),
                    summary.routed,
                    summary.exhausted,
                    fetched as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
                );
            }

            if pacing > Duration::ZERO {
                tokio::time::sleep(pacing).await;
            }
        }

        self.storage.complete_run(self.run_id)?;

        tracing::info!(
            "Processing complete in {:?}: {} routed, {} skipped, {} exhausted, {} write failures, {} already done",
            start_time.elapsed(),
            summary.routed,
            summary.skipped,
            summary.exhausted,
            summary.write_failed,
            summary.already_done
        );

        Ok(summary)
    }

    /// True if an earlier run already brought `appid` to a terminal state
    fn is_done(&self, appid: AppId) -> Result<bool, HarvestError> {
        let Some(item) = self.storage.get_item(appid)? else {
            return Ok(false);
        };

        if self.options.retry_failed {
            let no_data =
                item.state == ItemState::Skipped && item.message.as_deref() == Some(NO_DATA);
            if no_data || item.state == ItemState::ExhaustedRetries {
                return Ok(false);
            }
        }

        Ok(item.state.is_terminal())
    }

    /// Fetches one identifier and records its outcome
    async fn process(&mut self, appid: AppId, summary: &mut RunSummary) -> Result<(), HarvestError> {
        self.storage
            .set_item_state(appid, ItemState::Fetching, self.run_id, None, 0, None)?;

        let report = self.fetcher.fetch(appid).await;
        let attempts = report.attempts;

        match report.outcome {
            FetchOutcome::Found(record) => {
                let kind = record.kind().to_string();
                match self.route(appid, &record) {
                    Routing::Routed => {
                        if let Err(e) = self.processed_log.append(appid) {
                            tracing::error!(
                                "Error writing AppID {} to {}: {}",
                                appid,
                                self.processed_log.path().display(),
                                e
                            );
                        }
                        self.storage.set_item_state(
                            appid,
                            ItemState::Routed,
                            self.run_id,
                            Some(&kind),
                            attempts,
                            None,
                        )?;
                        summary.routed += 1;
                    }
                    Routing::Skipped(reason) => {
                        tracing::info!("Skipping AppID {}: {}", appid, reason);
                        self.storage.set_item_state(
                            appid,
                            ItemState::Skipped,
                            self.run_id,
                            Some(&kind),
                            attempts,
                            Some(&reason),
                        )?;
                        summary.skipped += 1;
                    }
                    Routing::WriteFailed(e) => {
                        tracing::error!("Error saving AppID {}: {}", appid, e);
                        self.storage.set_item_state(
                            appid,
                            ItemState::Pending,
                            self.run_id,
                            Some(&kind),
                            attempts,
                            Some(&e.to_string()),
                        )?;
                        summary.write_failed += 1;
                    }
                }
            }
            FetchOutcome::NoData => {
                tracing::info!("Skipping AppID {} due to missing data", appid);
                self.storage.set_item_state(
                    appid,
                    ItemState::Skipped,
                    self.run_id,
                    None,
                    attempts,
                    Some(NO_DATA),
                )?;
                summary.skipped += 1;
            }
            FetchOutcome::Exhausted { last_error } => {
                tracing::warn!(
                    "Giving up on AppID {} after {} attempt(s)",
                    appid,
                    attempts
                );
                self.storage.set_item_state(
                    appid,
                    ItemState::ExhaustedRetries,
                    self.run_id,
                    None,
                    attempts,
                    Some(&last_error),
                )?;
                summary.exhausted += 1;
            }
        }

        Ok(())
    }

    /// Writes `record` to the table its type selects
    fn route(&self, appid: AppId, record: &DetailRecord) -> Routing {
        let written = match record {
            DetailRecord::Game(game) => {
                let result = self.tables.base_games.append(&BaseGameRow::from(game));
                if result.is_ok() {
                    tracing::info!("Processed base game (AppID {})", appid);
                }
                result
            }
            DetailRecord::Dlc(link) => {
                let Some(row) = DlcRow::from_link(link) else {
                    return Routing::Skipped(format!(
                        "DLC {} missing valid 'fullgame' info",
                        appid
                    ));
                };
                let result = self.tables.dlcs.append(&row);
                if result.is_ok() {
                    tracing::info!(
                        "Processed DLC (AppID {}) for base game {}",
                        appid,
                        row.base_appid
                    );
                }
                result
            }
            DetailRecord::Demo(link) => {
                let Some(row) = DemoRow::from_link(link) else {
                    return Routing::Skipped(format!(
                        "Demo {} missing valid 'fullgame' info",
                        appid
                    ));
                };
                let result = self.tables.demos.append(&row);
                if result.is_ok() {
                    tracing::info!("Processed demo (AppID {})", appid);
                }
                result
            }
            DetailRecord::Unknown(kind) => {
                return Routing::Skipped(format!("unknown type '{}'", kind));
            }
        };

        match written {
            Ok(()) => Routing::Routed,
            Err(e) => Routing::WriteFailed(e),
        }
    }
}

/// Runs a complete detail crawl over `appids`
///
/// # Example
///
/// ```no_run
/// use steam_harvest::config::load_or_default;
/// use steam_harvest::crawler::{run_crawl, RunOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_or_default(None)?;
/// let summary = run_crawl(config, &hash, RunOptions::default(), &[10, 20, 30]).await?;
/// println!("{} routed", summary.routed);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: &str,
    options: RunOptions,
    appids: &[AppId],
) -> Result<RunSummary, HarvestError> {
    let mut coordinator = Coordinator::new(config, config_hash, options)?;
    coordinator.run(appids).await
}
