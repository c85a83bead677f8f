use crate::config::types::{
    ApiConfig, Config, CrawlerConfig, InputConfig, OutputConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates endpoint configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_endpoint("detail_url", &config.detail_url)?;
    validate_endpoint("app_list_url", &config.app_list_url)?;

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.country_code.is_empty() || config.language.is_empty() {
        return Err(ConfigError::Validation(
            "country_code and language cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoint(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.rate_limit_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_requests must be >= 1, got {}",
            config.rate_limit_requests
        )));
    }

    if config.rate_limit_window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_window_secs must be >= 1, got {}",
            config.rate_limit_window_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.column.trim().is_empty() {
        return Err(ConfigError::Validation(
            "input column cannot be empty".to_string(),
        ));
    }

    if matches!(&config.path, Some(p) if p.is_empty()) {
        return Err(ConfigError::Validation(
            "input path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Output paths must be set and distinct
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("base_games_path", &config.base_games_path),
        ("dlcs_path", &config.dlcs_path),
        ("demos_path", &config.demos_path),
        ("processed_log_path", &config.processed_log_path),
        ("errored_log_path", &config.errored_log_path),
        ("checkpoint_path", &config.checkpoint_path),
        ("app_list_path", &config.app_list_path),
    ];

    for (i, (name, path)) in paths.iter().enumerate() {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
        if let Some((other, _)) = paths[..i].iter().find(|(_, p)| p == path) {
            return Err(ConfigError::Validation(format!(
                "{} and {} both point at '{}'",
                other, name, path
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
