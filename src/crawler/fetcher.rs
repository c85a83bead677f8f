//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the detail crawl, including:
//! - Building HTTP clients with proper user agent strings
//! - Per-app detail lookups against the store API
//! - Bounded retry with a fixed delay for transient failures
//! - Recording identifiers whose retries ran out

use crate::config::{ApiConfig, CrawlerConfig, UserAgentConfig};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::{parse_detail_response, DetailLookup, DetailRecord};
use crate::output::AppendLog;
use crate::{AppId, HarvestError};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of a detail fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The store returned a payload for the identifier
    Found(DetailRecord),

    /// The store answered without a successful entry; not retried
    NoData,

    /// Every attempt failed with a transient fault
    Exhausted {
        /// Description of the last failure
        last_error: String,
    },
}

/// A fetch outcome together with the number of network attempts it took
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub outcome: FetchOutcome,
    pub attempts: u32,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use steam_harvest::config::UserAgentConfig;
/// use steam_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Short description of a transport failure for the logs
fn describe_error(error: &HarvestError) -> String {
    match error {
        HarvestError::Http { source, .. } if source.is_timeout() => "Request timeout".to_string(),
        HarvestError::Http { source, .. } if source.is_connect() => {
            "Connection refused".to_string()
        }
        other => other.to_string(),
    }
}

/// Performs per-identifier detail lookups with bounded retry
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Timeout / connection error | Retry after the fixed delay |
/// | Non-2xx status | Retry after the fixed delay |
/// | Undecodable or `null` body | Retry after the fixed delay |
/// | Entry missing or `success: false` | Immediate → NoData |
/// | Attempts exhausted, or a non-retryable fault | Log identifier as failed → Exhausted |
pub struct DetailFetcher {
    client: Client,
    endpoint: Url,
    country_code: String,
    language: String,
    max_retries: u32,
    retry_delay: Duration,
    limiter: RateLimiter,
    failure_log: AppendLog,
}

impl DetailFetcher {
    pub fn new(
        client: Client,
        api: &ApiConfig,
        crawler: &CrawlerConfig,
        failure_log: AppendLog,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            client,
            endpoint: Url::parse(&api.detail_url)?,
            country_code: api.country_code.clone(),
            language: api.language.clone(),
            max_retries: crawler.max_retries.max(1),
            retry_delay: crawler.retry_delay(),
            limiter: RateLimiter::new(crawler.rate_limit_requests, crawler.rate_limit_window()),
            failure_log,
        })
    }

    /// Lookup URL for one identifier
    pub fn detail_url(&self, appid: AppId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("appids", &appid.to_string())
            .append_pair("cc", &self.country_code)
            .append_pair("l", &self.language);
        url
    }

    /// Issues one request and interprets the reply
    async fn request_once(&mut self, appid: AppId) -> Result<DetailLookup, HarvestError> {
        let url = self.detail_url(appid);
        self.limiter.acquire().await;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        parse_detail_response(&body, appid)
    }

    /// Fetches the detail record for `appid`
    ///
    /// Makes at most `max_retries` attempts, sleeping the fixed retry delay
    /// between failed ones. When they are all used up the identifier is appended
    /// to the permanent-failure log.
    pub async fn fetch(&mut self, appid: AppId) -> FetchReport {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.request_once(appid).await {
                Ok(DetailLookup::Found(record)) => {
                    return FetchReport {
                        outcome: FetchOutcome::Found(record),
                        attempts: attempt,
                    };
                }
                Ok(DetailLookup::NoData) => {
                    tracing::info!("No valid data for AppID {}", appid);
                    return FetchReport {
                        outcome: FetchOutcome::NoData,
                        attempts: attempt,
                    };
                }
                Err(e) => e,
            };

            let description = describe_error(&error);
            tracing::warn!(
                "Error fetching data for AppID {} (attempt {}/{}): {}",
                appid,
                attempt,
                self.max_retries,
                description
            );

            if attempt >= self.max_retries || !error.is_transient() {
                if let Err(e) = self.failure_log.append(appid) {
                    tracing::error!(
                        "Error writing AppID {} to {}: {}",
                        appid,
                        self.failure_log.path().display(),
                        e
                    );
                }
                return FetchReport {
                    outcome: FetchOutcome::Exhausted {
                        last_error: description,
                    },
                    attempts: attempt,
                };
            }

            tokio::time::sleep(self.retry_delay).await;
        }
    }
}
