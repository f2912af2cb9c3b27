//! Learner record store
//!
//! The orchestrator only talks to [`LearnerStore`]; which backend sits behind
//! it is a configuration choice.

pub mod locks;
pub mod memory;
pub mod redis;
pub mod sql;

use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::config::{Settings, StorageBackend};
use crate::database;
use crate::models::{ConversationEntry, LearnerState};
use crate::utils::errors::{PjotinhaError, Result};

pub use locks::{SenderGuard, SenderLocks};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use sql::SqlStore;

/// Keyed storage of learner progress plus the append-only conversation log
#[async_trait]
pub trait LearnerStore: Send + Sync {
    /// Load the record for a sender, if one exists
    async fn get(&self, sender_id: &str) -> Result<Option<LearnerState>>;

    /// Create a fresh record; fails with `LearnerExists` if one is present
    async fn create(&self, sender_id: &str) -> Result<LearnerState>;

    /// Load the record for a sender, creating it at the start stage if absent
    async fn get_or_create(&self, sender_id: &str) -> Result<LearnerState> {
        if let Some(state) = self.get(sender_id).await? {
            return Ok(state);
        }

        match self.create(sender_id).await {
            Err(PjotinhaError::LearnerExists { .. }) => {
                self.get(sender_id)
                    .await?
                    .ok_or_else(|| PjotinhaError::LearnerNotFound {
                        sender_id: sender_id.to_string(),
                    })
            }
            other => other,
        }
    }

    /// Persist the full state, inserting or replacing it
    async fn save(&self, state: &LearnerState) -> Result<()>;

    async fn append_entry(&self, entry: &ConversationEntry) -> Result<()>;

    /// The last `limit` entries for a sender, oldest first
    async fn recent_entries(&self, sender_id: &str, limit: usize) -> Result<Vec<ConversationEntry>>;

    async fn health_check(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by `storage.backend`
pub async fn build_store(settings: &Settings) -> Result<Arc<dyn LearnerStore>> {
    let store: Arc<dyn LearnerStore> = match settings.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => {
            let pool = database::create_pool(&settings.database).await?;
            database::run_migrations(&pool).await?;
            Arc::new(SqlStore::new(pool))
        }
        StorageBackend::Redis => Arc::new(RedisStore::new(settings.redis.clone()).await?),
    };

    info!(backend = store.backend_name(), "Learner store initialized");
    Ok(store)
}
