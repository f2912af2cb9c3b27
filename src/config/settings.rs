//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from built-in defaults, an optional TOML file and
//! environment variables.

use serde::{Deserialize, Serialize};

/// Environment variable pointing at an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "PJOTINHA_CONFIG";

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub llm: LlmConfig,
    pub content: ContentConfig,
    pub flow: FlowConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Webhook server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which learner store backend to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Sqlite,
    Redis,
}

/// Learner store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Chat-completion API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Course content configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    pub modules_dir: String,
    pub module_count: u32,
    pub parts_per_module: u32,
    pub questions_per_module: u32,
}

/// Conversation flow configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
    pub history_window: usize,
    pub start_keywords: Vec<String>,
    pub continue_keywords: Vec<String>,
}

/// Message catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct I18nConfig {
    pub default_language: String,
    pub translations_dir: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(&path).required(false))
            .add_source(
                config::Environment::with_prefix("PJOTINHA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;

        // The completion API key is conventionally exported as OPENAI_API_KEY
        if settings.llm.api_key.is_none() {
            settings.llm.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PjotinhaError> {
        super::validation::validate_settings(self)
    }

    /// Socket address the webhook server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Sqlite,
            },
            database: DatabaseConfig {
                url: "sqlite://alunos.db?mode=rwc".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "pjotinha:".to_string(),
            },
            llm: LlmConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                api_key: None,
                model: "gpt-3.5-turbo".to_string(),
                timeout_seconds: 15,
                temperature: 0.7,
                max_tokens: 1000,
            },
            content: ContentConfig {
                modules_dir: "content".to_string(),
                module_count: 3,
                parts_per_module: 4,
                questions_per_module: 3,
            },
            flow: FlowConfig {
                history_window: 10,
                start_keywords: ["continuar", "começar", "comecar", "sim", "iniciar", "bora", "vamos"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                continue_keywords: ["continuar", "próximo", "proximo", "avançar", "avancar", "seguir", "quiz"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
            },
            i18n: I18nConfig {
                default_language: "pt-BR".to_string(),
                translations_dir: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "pjotinha.log".to_string(),
                json: false,
            },
        }
    }
}
