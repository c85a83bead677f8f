use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Steam-Harvest
///
/// Every section falls back to its defaults, so an empty file (or no file at all)
/// reproduces the stock crawl against the public store endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Per-app detail lookup endpoint
    #[serde(rename = "detail-url")]
    pub detail_url: String,

    /// Full catalog listing endpoint
    #[serde(rename = "app-list-url")]
    pub app_list_url: String,

    /// Storefront country code (`cc` query parameter)
    #[serde(rename = "country-code")]
    pub country_code: String,

    /// Storefront language (`l` query parameter)
    pub language: String,

    /// Timeout applied to every request (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            detail_url: "https://store.steampowered.com/api/appdetails/".to_string(),
            app_list_url: "https://api.steampowered.com/ISteamApps/GetAppList/v2/".to_string(),
            country_code: "us".to_string(),
            language: "en".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of attempts per identifier
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Fixed delay between failed attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Fixed delay after every identifier, whatever its outcome (milliseconds)
    #[serde(rename = "pacing-delay-ms")]
    pub pacing_delay_ms: u64,

    /// Requests allowed per rate limit window
    #[serde(rename = "rate-limit-requests")]
    pub rate_limit_requests: u32,

    /// Length of the rate limit window (seconds)
    #[serde(rename = "rate-limit-window-secs")]
    pub rate_limit_window_secs: u64,
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        // The store allows 200 detail lookups per 5 minutes.
        Self {
            max_retries: 10,
            retry_delay_ms: 1100,
            pacing_delay_ms: 1100,
            rate_limit_requests: 200,
            rate_limit_window_secs: 300,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SteamHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/steam-harvest".to_string(),
            contact_email: "steam-harvest@example.com".to_string(),
        }
    }
}

/// Input table configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the identifier table; prompted for when absent
    pub path: Option<String>,

    /// Header of the identifier column
    pub column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            column: "appid".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    #[serde(rename = "base-games-path")]
    pub base_games_path: String,

    #[serde(rename = "dlcs-path")]
    pub dlcs_path: String,

    #[serde(rename = "demos-path")]
    pub demos_path: String,

    /// Append-only log of routed identifiers
    #[serde(rename = "processed-log-path")]
    pub processed_log_path: String,

    /// Append-only log of identifiers that exhausted their retries
    #[serde(rename = "errored-log-path")]
    pub errored_log_path: String,

    /// Path to the SQLite checkpoint store
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Destination of the catalog listing job
    #[serde(rename = "app-list-path")]
    pub app_list_path: String,
}

impl OutputConfig {
    /// Places every output file under `dir`, keeping the default file names
    pub fn in_dir(dir: &std::path::Path) -> Self {
        let defaults = Self::default();
        let join = |name: &str| dir.join(name).to_string_lossy().into_owned();
        Self {
            base_games_path: join(&defaults.base_games_path),
            dlcs_path: join(&defaults.dlcs_path),
            demos_path: join(&defaults.demos_path),
            processed_log_path: join(&defaults.processed_log_path),
            errored_log_path: join(&defaults.errored_log_path),
            checkpoint_path: join(&defaults.checkpoint_path),
            app_list_path: join(&defaults.app_list_path),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_games_path: "base_games.csv".to_string(),
            dlcs_path: "dlcs.csv".to_string(),
            demos_path: "demos.csv".to_string(),
            processed_log_path: "processed_appids.txt".to_string(),
            errored_log_path: "errored_appids.txt".to_string(),
            checkpoint_path: "checkpoint.db".to_string(),
            app_list_path: "AllGames.csv".to_string(),
        }
    }
}
