//! Configuration module for Steam-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; omitted sections fall back to the stock store endpoints
//! and a pacing of one request per 1.1 seconds.
//!
//! # Example
//!
//! ```no_run
//! use steam_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Attempts per app: {}", config.crawler.max_retries);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    ApiConfig, Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig,
};

pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, load_or_default,
    DEFAULT_CONFIG_HASH,
};
pub use validation::validate;
