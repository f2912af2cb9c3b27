//! SQLite-backed learner store

use async_trait::async_trait;
use tracing::debug;
use crate::database::{self, DatabasePool, DatabaseService};
use crate::models::{ConversationEntry, LearnerState};
use crate::utils::errors::Result;
use crate::utils::helpers::mask_sender;
use super::LearnerStore;

#[derive(Debug, Clone)]
pub struct SqlStore {
    db: DatabaseService,
}

impl SqlStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            db: DatabaseService::new(pool),
        }
    }

    pub fn database(&self) -> &DatabaseService {
        &self.db
    }
}

#[async_trait]
impl LearnerStore for SqlStore {
    async fn get(&self, sender_id: &str) -> Result<Option<LearnerState>> {
        self.db.learners.find_by_sender(sender_id).await
    }

    async fn create(&self, sender_id: &str) -> Result<LearnerState> {
        let state = self.db.learners.create(sender_id).await?;
        debug!(sender = %mask_sender(sender_id), "Learner created");
        Ok(state)
    }

    async fn save(&self, state: &LearnerState) -> Result<()> {
        self.db.learners.upsert(state).await
    }

    async fn append_entry(&self, entry: &ConversationEntry) -> Result<()> {
        self.db.conversations.append(entry).await
    }

    async fn recent_entries(&self, sender_id: &str, limit: usize) -> Result<Vec<ConversationEntry>> {
        self.db.conversations.recent(sender_id, limit).await
    }

    async fn health_check(&self) -> Result<()> {
        database::health_check(self.db.pool()).await
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
