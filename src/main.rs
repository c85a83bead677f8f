//! Steam-Harvest main entry point
//!
//! This is the command-line interface for the Steam-Harvest detail crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use steam_harvest::config::{load_or_default, Config};
use steam_harvest::crawler::{crawl, harvest_app_list, RunOptions};
use steam_harvest::input::{prompt_input_path, read_identifiers};
use tracing_subscriber::EnvFilter;

/// Steam-Harvest: a resumable store detail crawler
///
/// Steam-Harvest reads app ids from a table, looks each one up in the store
/// API, and sorts the answers into base game, DLC and demo tables. Progress
/// is checkpointed so an interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "steam-harvest")]
#[command(version)]
#[command(about = "A resumable store detail crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Identifier table to crawl (prompted for when neither this nor the config names one)
    #[arg(short, long, value_name = "CSV")]
    input: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring previous checkpoints
    #[arg(long)]
    fresh: bool,

    /// Fetch identifiers that ran out of retries or got no data in an earlier run again
    #[arg(long)]
    retry_failed: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "fetch_app_list"])]
    dry_run: bool,

    /// Show statistics from the checkpoint store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fetch_app_list"])]
    stats: bool,

    /// Download the full app list into the configured table and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    fetch_app_list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match load_or_default(cli.config.as_deref()) {
        Ok((cfg, hash)) => {
            match &cli.config {
                Some(path) => tracing::info!(
                    "Configuration loaded from {} (hash: {})",
                    path.display(),
                    hash
                ),
                None => tracing::info!("Using default configuration"),
            }
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        handle_stats(&config)
    } else if cli.fetch_app_list {
        handle_fetch_app_list(&config).await
    } else {
        let input = resolve_input_path(cli.input, &config)?;
        if cli.dry_run {
            handle_dry_run(&config, &input)
        } else {
            let options = RunOptions {
                fresh: cli.fresh,
                retry_failed: cli.retry_failed,
            };
            handle_crawl(config, &config_hash, options, &input).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("steam_harvest=info,warn"),
            1 => EnvFilter::new("steam_harvest=debug,info"),
            2 => EnvFilter::new("steam_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Picks the identifier table: command line first, then config, then an interactive prompt
fn resolve_input_path(cli_input: Option<PathBuf>, config: &Config) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli_input {
        return Ok(path);
    }
    if let Some(path) = &config.input.path {
        return Ok(PathBuf::from(path));
    }
    Ok(prompt_input_path()?)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, input: &Path) -> anyhow::Result<()> {
    println!("=== Steam-Harvest Dry Run ===\n");

    println!("API:");
    println!("  Detail endpoint: {}", config.api.detail_url);
    println!(
        "  Country / language: {} / {}",
        config.api.country_code, config.api.language
    );
    println!("  Request timeout: {}ms", config.api.request_timeout_ms);

    println!("\nCrawler Configuration:");
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Pacing delay: {}ms", config.crawler.pacing_delay_ms);
    println!(
        "  Rate limit: {} requests / {}s",
        config.crawler.rate_limit_requests, config.crawler.rate_limit_window_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Base games: {}", config.output.base_games_path);
    println!("  DLCs: {}", config.output.dlcs_path);
    println!("  Demos: {}", config.output.demos_path);
    println!("  Processed log: {}", config.output.processed_log_path);
    println!("  Errored log: {}", config.output.errored_log_path);
    println!("  Checkpoints: {}", config.output.checkpoint_path);

    let ids = read_identifiers(input, &config.input.column)
        .with_context(|| format!("reading identifiers from {}", input.display()))?;

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} app id(s) from {}",
        ids.len(),
        input.display()
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the checkpoint store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use steam_harvest::output::{load_statistics, print_statistics};
    use steam_harvest::storage::SqliteStorage;

    println!("Checkpoint store: {}\n", config.output.checkpoint_path);

    let storage = SqliteStorage::new(Path::new(&config.output.checkpoint_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --fetch-app-list mode: writes the catalog listing
async fn handle_fetch_app_list(config: &Config) -> anyhow::Result<()> {
    let count = harvest_app_list(config)
        .await
        .context("fetching the app list")?;

    println!(
        "✓ Saved {} apps to {}",
        count, config.output.app_list_path
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    options: RunOptions,
    input: &Path,
) -> anyhow::Result<()> {
    if options.fresh {
        tracing::info!("Starting fresh crawl (ignoring previous checkpoints)");
    } else {
        tracing::info!("Starting crawl (finished app ids will be skipped)");
    }

    let ids = read_identifiers(input, &config.input.column)
        .with_context(|| format!("reading identifiers from {}", input.display()))?;
    tracing::info!("Loaded {} app id(s) from {}", ids.len(), input.display());

    match crawl(config, config_hash, options, &ids).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed: {} routed, {} skipped, {} exhausted",
                summary.routed,
                summary.skipped,
                summary.exhausted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
