use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Hash recorded for runs that use the built-in defaults
pub const DEFAULT_CONFIG_HASH: &str = "default";

/// Parses and validates TOML text
fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads the harvest settings at `path`
///
/// Keys left out of the file keep their defaults, so an empty file is a valid
/// configuration.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use steam_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Attempts per app: {}", config.crawler.max_retries);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// SHA-256 (hex) of the file at `path`, recorded with every run
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Reads the file once and returns the parsed settings with the hash of that same text
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

/// Settings for a run: the file at `path` when given, else validated defaults
pub fn load_or_default(path: Option<&Path>) -> Result<(Config, String), ConfigError> {
    let Some(path) = path else {
        let config = Config::default();
        validate(&config)?;
        return Ok((config, DEFAULT_CONFIG_HASH.to_string()));
    };
    load_config_with_hash(path)
}
