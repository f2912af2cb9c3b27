//! Services module
//!
//! This module contains the collaborators the conversation flow relies on:
//! the text-completion client, field extraction and course content.

pub mod content;
pub mod documents;
pub mod extractor;
pub mod llm;

// Re-export commonly used services
pub use content::{ContentProvider, LessonBlock, QuizQuestion};
pub use documents::{DocumentLoader, FileDocumentLoader};
pub use extractor::FieldExtractor;
pub use llm::{ChatTurn, CompletionClient, CompletionRequest, DisabledCompletionClient, OpenAiClient};

use std::sync::Arc;
use tracing::{info, warn};
use crate::config::settings::Settings;
use crate::i18n::I18n;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub completion: Arc<dyn CompletionClient>,
    pub extractor: FieldExtractor,
    pub content: Arc<ContentProvider>,
    pub i18n: Arc<I18n>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, i18n: Arc<I18n>) -> Result<Self> {
        let completion: Arc<dyn CompletionClient> = match &settings.llm.api_key {
            Some(key) if !key.trim().is_empty() => {
                info!(model = %settings.llm.model, "Completion client enabled");
                Arc::new(OpenAiClient::new(&settings.llm, key.trim())?)
            }
            _ => {
                warn!("No completion API key configured, running on fallbacks only");
                Arc::new(DisabledCompletionClient)
            }
        };

        Ok(Self::with_client(settings, i18n, completion))
    }

    /// Build the services around an existing completion client
    pub fn with_client(settings: &Settings, i18n: Arc<I18n>, completion: Arc<dyn CompletionClient>) -> Self {
        let extractor = FieldExtractor::new(Arc::clone(&completion), Arc::clone(&i18n));
        let content = Arc::new(ContentProvider::new(
            &settings.content,
            Arc::new(FileDocumentLoader),
            Arc::clone(&completion),
            Arc::clone(&i18n),
        ));

        Self {
            completion,
            extractor,
            content,
            i18n,
        }
    }

    /// Health status for all services
    pub fn health(&self) -> ServiceHealthStatus {
        ServiceHealthStatus {
            completion_enabled: self.completion.is_enabled(),
            catalog_keys: self.i18n.key_count(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub completion_enabled: bool,
    pub catalog_keys: usize,
}

impl ServiceHealthStatus {
    /// Get list of degraded services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.completion_enabled {
            issues.push("Completion client disabled, replies use fallbacks".to_string());
        }
        if self.catalog_keys == 0 {
            issues.push("Message catalog is empty".to_string());
        }

        issues
    }
}
