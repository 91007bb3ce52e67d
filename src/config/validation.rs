use crate::config::types::{Config, CrawlerConfig, GithubConfig, OutputConfig, SiteEntry, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;
    validate_github_config(&config.github)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "delay_ms must be <= 60000ms, got {}ms",
            config.delay_ms
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    if config.freshness_days < 0 {
        return Err(ConfigError::Validation(format!(
            "freshness_days cannot be negative, got {}",
            config.freshness_days
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

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates documentation site entries
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    for site in sites {
        let seed = parse_http_url(&site.seed, "seed")?;

        if site.allow_prefixes.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have at least one allowed prefix",
                site.seed
            )));
        }

        if let Some(prefix) = site.allow_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::Validation(format!(
                "Allowed prefix '{}' must start with '/'",
                prefix
            )));
        }

        if !site
            .allow_prefixes
            .iter()
            .any(|prefix| seed.path().starts_with(prefix.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "Seed '{}' is outside its own allowed prefixes",
                site.seed
            )));
        }
    }

    Ok(())
}

/// Validates repository harvester configuration
fn validate_github_config(config: &GithubConfig) -> Result<(), ConfigError> {
    parse_http_url(&config.api_base, "api_base")?;
    parse_http_url(&config.web_base, "web_base")?;

    if config.max_file_size < 1 {
        return Err(ConfigError::Validation(
            "max_file_size must be >= 1 byte".to_string(),
        ));
    }

    if config.max_files_per_repo < 1 {
        return Err(ConfigError::Validation(format!(
            "max_files_per_repo must be >= 1, got {}",
            config.max_files_per_repo
        )));
    }

    if config.repositories.iter().any(|r| r.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "repository references cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses a URL that must use http or https and carry a host
fn parse_http_url(raw: &str, field: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, raw
        )));
    }

    Ok(url)
}
