//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{EventHubError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config("server", &settings.server)?;
    validate_server_config("stats_server", &settings.stats_server)?;
    validate_database_config("database", &settings.database)?;
    validate_database_config("stats_database", &settings.stats_database)?;
    validate_stats_client_config(&settings.stats_client)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate an HTTP listener section
fn validate_server_config(section: &str, config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(EventHubError::Config(format!("{}.host is required", section)));
    }

    if config.port == 0 {
        return Err(EventHubError::Config(format!("{}.port must be greater than 0", section)));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(section: &str, config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(EventHubError::Config(format!("{}.url is required", section)));
    }

    if config.max_connections == 0 {
        return Err(EventHubError::Config(format!(
            "{}.max_connections must be greater than 0",
            section
        )));
    }

    if config.min_connections > config.max_connections {
        return Err(EventHubError::Config(format!(
            "{}.min_connections cannot be greater than max_connections",
            section
        )));
    }

    Ok(())
}

/// Validate the stats client section
fn validate_stats_client_config(config: &super::StatsClientConfig) -> Result<()> {
    url::Url::parse(&config.base_url).map_err(|e| {
        EventHubError::Config(format!("stats_client.base_url is not a valid URL: {}", e))
    })?;

    if config.app_name.trim().is_empty() {
        return Err(EventHubError::Config(
            "stats_client.app_name is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(EventHubError::Config(
            "stats_client.timeout_seconds must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(EventHubError::Config(
            "Log level is required".to_string()
        ));
    }

    if config.directory.is_empty() {
        return Err(EventHubError::Config(
            "Log directory is required".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let mut settings = Settings::default();
        settings.stats_database.min_connections = 20;
        assert_matches!(
            validate_settings(&settings),
            Err(EventHubError::Config(msg)) if msg.starts_with("stats_database.")
        );
    }

    #[test]
    fn test_rejects_bad_stats_url() {
        let mut settings = Settings::default();
        settings.stats_client.base_url = "not a url".to_string();
        assert_matches!(validate_settings(&settings), Err(EventHubError::Config(_)));
    }
}
