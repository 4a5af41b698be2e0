use crate::config::types::{Config, OutputMode};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates a parsed configuration
///
/// Checks that:
/// - Concurrency ceilings and the retry limit are usable
/// - Every seed URL parses and its host is in the allowed set
/// - The user-agent pool is non-empty
/// - Status code sets contain valid HTTP statuses
/// - Region names and destination paths are unique
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler(config)?;
    validate_identity(config)?;
    validate_scope(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_crawler(config: &Config) -> Result<(), ConfigError> {
    let crawler = &config.crawler;

    if crawler.max_concurrent_fetches == 0 {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be at least 1".to_string(),
        ));
    }

    if crawler.per_host_fetches == 0 {
        return Err(ConfigError::Validation(
            "per-host-fetches must be at least 1".to_string(),
        ));
    }

    if crawler.per_host_fetches > crawler.max_concurrent_fetches {
        return Err(ConfigError::Validation(format!(
            "per-host-fetches ({}) cannot exceed max-concurrent-fetches ({})",
            crawler.per_host_fetches, crawler.max_concurrent_fetches
        )));
    }

    if crawler.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be at least 1".to_string(),
        ));
    }

    for status in crawler
        .retryable_statuses
        .iter()
        .chain(crawler.tolerated_statuses.iter())
    {
        if !(100..=599).contains(status) {
            return Err(ConfigError::Validation(format!(
                "invalid HTTP status code: {}",
                status
            )));
        }
    }

    Ok(())
}

fn validate_identity(config: &Config) -> Result<(), ConfigError> {
    if config.identity.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents pool must not be empty".to_string(),
        ));
    }

    if config.identity.user_agents.iter().any(|ua| ua.is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents pool contains an empty string".to_string(),
        ));
    }

    Ok(())
}

fn validate_scope(config: &Config) -> Result<(), ConfigError> {
    if config.scope.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    if config.scope.allowed_hosts.is_empty() {
        return Err(ConfigError::Validation(
            "at least one allowed host is required".to_string(),
        ));
    }

    let allowed: HashSet<String> = config
        .scope
        .allowed_hosts
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    for seed in &config.scope.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::Validation(format!("seed URL {}: {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "seed URL {} has unsupported scheme {}",
                seed,
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ConfigError::Validation(format!("seed URL {} has no host", seed)))?;

        if !allowed.contains(&host.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "seed URL {} is outside the allowed hosts",
                seed
            )));
        }
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<(), ConfigError> {
    let output = &config.output;

    if output.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path must not be empty".to_string(),
        ));
    }

    if output.mode == OutputMode::Regions {
        if output.regions.is_empty() {
            return Err(ConfigError::Validation(
                "regions mode requires at least one [[output.region]] entry".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        paths.insert(output.unknown_path.clone());

        for region in &output.regions {
            if region.name.is_empty() {
                return Err(ConfigError::Validation(
                    "region name must not be empty".to_string(),
                ));
            }

            if region.hosts.is_empty() && region.path_prefixes.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "region {} has no hosts or path-prefixes",
                    region.name
                )));
            }

            if !names.insert(region.name.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate region name: {}",
                    region.name
                )));
            }

            if !paths.insert(region.path.clone()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate region destination: {}",
                    region.path
                )));
            }
        }
    }

    Ok(())
}
