use crate::config::types::{
    CatalogConfig, Config, OutputConfig, PacingConfig, RetryConfig, SessionConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_session_config(&config.session)?;
    validate_pacing_config(&config.pacing)?;
    validate_retry_config(&config.retry)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates catalog endpoint configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.per_page < 1 || config.per_page > 200 {
        return Err(ConfigError::Validation(format!(
            "per-page must be between 1 and 200, got {}",
            config.per_page
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates session identification
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.harvester_name.is_empty() {
        return Err(ConfigError::Validation(
            "harvester-name cannot be empty".to_string(),
        ));
    }

    if !config
        .harvester_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "harvester-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.harvester_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates rate limiter configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    if config.requests_per_interval < 1 {
        return Err(ConfigError::Validation(
            "requests-per-interval must be >= 1".to_string(),
        ));
    }

    if config.interval_ms < 1 {
        return Err(ConfigError::Validation(
            "interval-ms must be >= 1".to_string(),
        ));
    }

    if config.burst_allowance < 1 {
        return Err(ConfigError::Validation(
            "burst-allowance must be >= 1".to_string(),
        ));
    }

    if config.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff-factor must be >= 1.0, got {}",
            config.backoff_factor
        )));
    }

    if config.max_interval_ms < config.interval_ms {
        return Err(ConfigError::Validation(format!(
            "max-interval-ms ({}) must be >= interval-ms ({})",
            config.max_interval_ms, config.interval_ms
        )));
    }

    Ok(())
}

/// Validates retry policy configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1".to_string(),
        ));
    }

    if config.base_delay_ms < 1 {
        return Err(ConfigError::Validation(
            "base-delay-ms must be >= 1".to_string(),
        ));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max-delay-ms ({}) must be >= base-delay-ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.download_dir.is_empty() {
        return Err(ConfigError::Validation(
            "download-dir cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_path.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email shape check: one '@' with a dotted domain after it
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact-email does not look like an email address: '{}'",
            email
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::PagingMode;

    fn valid_config() -> Config {
        Config {
            catalog: CatalogConfig {
                base_url: "https://api.openalex.org/works".to_string(),
                filter: Some("is_oa:true".to_string()),
                per_page: 100,
                paging: PagingMode::Cursor,
                fetch_timeout_secs: 30,
            },
            session: SessionConfig {
                harvester_name: "papermule".to_string(),
                harvester_version: "0.1".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "ops@example.com".to_string(),
            },
            pacing: PacingConfig {
                requests_per_interval: 1,
                interval_ms: 3000,
                burst_allowance: 1,
                adaptive: true,
                backoff_factor: 1.5,
                max_interval_ms: 60_000,
                decay_after_successes: 5,
            },
            retry: RetryConfig::default(),
            output: OutputConfig {
                download_dir: "./downloads".to_string(),
                checkpoint_path: "./checkpoint.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = valid_config();
        config.catalog.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_ftp_scheme() {
        let mut config = valid_config();
        config.catalog.base_url = "ftp://example.com/works".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_per_page_out_of_range() {
        let mut config = valid_config();
        config.catalog.per_page = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        let mut config = valid_config();
        config.catalog.per_page = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_harvester_name_rejects_spaces() {
        let mut config = valid_config();
        config.session.harvester_name = "paper mule".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_email() {
        let mut config = valid_config();
        config.session.contact_email = "not-an-email".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_backoff_factor_below_one() {
        let mut config = valid_config();
        config.pacing.backoff_factor = 0.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_max_interval_below_interval() {
        let mut config = valid_config();
        config.pacing.max_interval_ms = 100;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_max_delay_below_base_delay() {
        let mut config = valid_config();
        config.retry.base_delay_ms = 5000;
        config.retry.max_delay_ms = 1000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_paths() {
        let mut config = valid_config();
        config.output.download_dir = String::new();
        assert!(validate(&config).is_err());

        let mut config = valid_config();
        config.output.checkpoint_path = String::new();
        assert!(validate(&config).is_err());
    }
}
