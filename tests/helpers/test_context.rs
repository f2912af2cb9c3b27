//! Test context
//!
//! Wires an orchestrator over an in-memory store, a temporary content
//! directory and a caller-supplied completion client.

use std::path::Path;
use std::sync::Arc;
use pjotinha::config::{Settings, StorageBackend};
use pjotinha::handlers::{AppState, ConversationOrchestrator};
use pjotinha::i18n::I18n;
use pjotinha::models::LearnerState;
use pjotinha::services::{CompletionClient, ServiceFactory};
use pjotinha::storage::{LearnerStore, MemoryStore};
use tempfile::TempDir;
use super::test_data::{module_text, PROFILE_ANSWERS};

/// Default settings pointing at `content_dir`, stored in memory
pub fn test_settings(content_dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.storage.backend = StorageBackend::Memory;
    settings.content.modules_dir = content_dir.display().to_string();
    settings.llm.api_key = None;
    settings
}

pub struct TestContext {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub store: Arc<MemoryStore>,
    pub i18n: Arc<I18n>,
    pub settings: Settings,
    pub content_dir: TempDir,
}

impl TestContext {
    /// Context with an empty content directory, so module 1 uses built-in text
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_settings(client, |_| {})
    }

    /// Context with `modulo_<n>.txt` written for every module in the plan
    pub fn with_module_files(client: Arc<dyn CompletionClient>) -> Self {
        let context = Self::new(client);
        for module in 1..=context.settings.content.module_count {
            std::fs::write(
                context.content_dir.path().join(format!("modulo_{}.txt", module)),
                module_text(module),
            )
            .unwrap();
        }
        context
    }

    pub fn with_settings(client: Arc<dyn CompletionClient>, customize: impl FnOnce(&mut Settings)) -> Self {
        let content_dir = tempfile::tempdir().unwrap();
        let mut settings = test_settings(content_dir.path());
        customize(&mut settings);

        let i18n = Arc::new(I18n::embedded(&settings.i18n).unwrap());
        let store = Arc::new(MemoryStore::new());
        let dyn_store: Arc<dyn LearnerStore> = store.clone();
        let services = ServiceFactory::with_client(&settings, Arc::clone(&i18n), client);
        let orchestrator = Arc::new(ConversationOrchestrator::new(&settings, dyn_store, services));

        Self {
            orchestrator,
            store,
            i18n,
            settings,
            content_dir,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            orchestrator: Arc::clone(&self.orchestrator),
            i18n: Arc::clone(&self.i18n),
        }
    }

    pub async fn send(&self, sender: &str, text: &str) -> String {
        self.orchestrator.handle_inbound(sender, text).await.unwrap()
    }

    pub async fn state(&self, sender: &str) -> LearnerState {
        self.store.get(sender).await.unwrap().expect("learner should exist")
    }

    /// Greet and answer all profile questions
    pub async fn onboard(&self, sender: &str) {
        self.send(sender, "oi").await;
        for answer in PROFILE_ANSWERS {
            self.send(sender, answer).await;
        }
    }

    /// Onboard and start the course, leaving the learner at module 1 part 1
    pub async fn start_course(&self, sender: &str) {
        self.onboard(sender).await;
        self.send(sender, "continuar").await;
    }

    /// Start the course and read every lesson part of module 1
    pub async fn reach_first_quiz(&self, sender: &str) -> String {
        self.start_course(sender).await;
        let mut last = String::new();
        for _ in 0..self.settings.content.parts_per_module {
            last = self.send(sender, "continuar").await;
        }
        last
    }
}
