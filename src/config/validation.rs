//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{PjotinhaError, Result};
use super::{Settings, StorageBackend};

/// Largest history window the fallback prompt may embed
pub const MAX_HISTORY_WINDOW: usize = 10;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;

    match settings.storage.backend {
        StorageBackend::Sqlite => validate_database_config(&settings.database)?,
        StorageBackend::Redis => validate_redis_config(&settings.redis)?,
        StorageBackend::Memory => {}
    }

    validate_llm_config(&settings.llm)?;
    validate_content_config(&settings.content)?;
    validate_flow_config(&settings.flow)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(PjotinhaError::Config("Server host is required".to_string()));
    }

    if config.port == 0 {
        return Err(PjotinhaError::Config("Server port must be greater than 0".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PjotinhaError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(PjotinhaError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(PjotinhaError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PjotinhaError::Config("Redis URL is required".to_string()));
    }

    Ok(())
}

/// Validate completion API configuration
fn validate_llm_config(config: &super::LlmConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(PjotinhaError::Config("LLM base URL is required".to_string()));
    }

    if config.model.is_empty() {
        return Err(PjotinhaError::Config("LLM model is required".to_string()));
    }

    if config.timeout_seconds == 0 {
        return Err(PjotinhaError::Config(
            "LLM timeout must be greater than 0".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(PjotinhaError::Config(format!(
            "LLM temperature must be within 0.0..=2.0, got {}",
            config.temperature
        )));
    }

    Ok(())
}

/// Validate course content configuration
fn validate_content_config(config: &super::ContentConfig) -> Result<()> {
    if config.module_count == 0 {
        return Err(PjotinhaError::Config(
            "At least one course module must be configured".to_string(),
        ));
    }

    if config.parts_per_module == 0 {
        return Err(PjotinhaError::Config(
            "Lessons need at least one part per module".to_string(),
        ));
    }

    if config.questions_per_module == 0 {
        return Err(PjotinhaError::Config(
            "Quizzes need at least one question per module".to_string(),
        ));
    }

    Ok(())
}

/// Validate conversation flow configuration
fn validate_flow_config(config: &super::FlowConfig) -> Result<()> {
    if config.history_window == 0 || config.history_window > MAX_HISTORY_WINDOW {
        return Err(PjotinhaError::Config(format!(
            "History window must be within 1..={}",
            MAX_HISTORY_WINDOW
        )));
    }

    if config.start_keywords.is_empty() {
        return Err(PjotinhaError::Config(
            "At least one start keyword is required".to_string(),
        ));
    }

    if config.continue_keywords.is_empty() {
        return Err(PjotinhaError::Config(
            "At least one continue keyword is required".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PjotinhaError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PjotinhaError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_oversized_history_window() {
        let mut settings = Settings::default();
        settings.flow.history_window = 25;
        assert!(matches!(validate_settings(&settings), Err(PjotinhaError::Config(_))));
    }

    #[test]
    fn test_redis_url_only_checked_for_redis_backend() {
        let mut settings = Settings::default();
        settings.redis.url.clear();
        assert!(validate_settings(&settings).is_ok());

        settings.storage.backend = StorageBackend::Redis;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
