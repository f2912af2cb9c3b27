//! Pjotinha WhatsApp Bot
//!
//! Conversational onboarding and lesson delivery for the "Meu Primeiro CNPJ"
//! entrepreneurship course. Inbound messages arrive through a webhook, each
//! learner moves through profile collection, lessons and quizzes, and free
//! questions are answered by a text-completion backed assistant.

pub mod config;
pub mod database;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

use std::sync::Arc;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{PjotinhaError, Result};

// Re-export main components for easy access
pub use handlers::{AppState, ConversationOrchestrator};
pub use i18n::I18n;
pub use services::ServiceFactory;
pub use storage::LearnerStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}

/// Wire the catalog, store and services into the webhook state
pub async fn build_state(settings: &Settings) -> Result<AppState> {
    let i18n = Arc::new(I18n::load(&settings.i18n).await?);
    let store = storage::build_store(settings).await?;
    let services = ServiceFactory::new(settings, Arc::clone(&i18n))?;

    let issues = services.health().get_issues();
    for issue in &issues {
        tracing::warn!("{}", issue);
    }

    let orchestrator = Arc::new(ConversationOrchestrator::new(settings, store, services));
    Ok(AppState { orchestrator, i18n })
}
