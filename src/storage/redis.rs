//! Redis-backed learner store
//!
//! Learner state is kept as a JSON string under `<prefix>learner:<sender>`
//! and the conversation log as a list of JSON entries under
//! `<prefix>history:<sender>`. Keys never expire; progress is append-only.

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, error};
use crate::config::RedisConfig;
use crate::models::{ConversationEntry, LearnerState};
use crate::utils::errors::{PjotinhaError, Result};
use crate::utils::helpers::mask_sender;
use super::LearnerStore;

#[derive(Clone)]
pub struct RedisStore {
    connection_manager: redis::aio::ConnectionManager,
    config: RedisConfig,
}

impl RedisStore {
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            config,
        })
    }

    fn learner_key(&self, sender_id: &str) -> String {
        format!("{}learner:{}", self.config.prefix, sender_id)
    }

    fn history_key(&self, sender_id: &str) -> String {
        format!("{}history:{}", self.config.prefix, sender_id)
    }
}

#[async_trait]
impl LearnerStore for RedisStore {
    async fn get(&self, sender_id: &str) -> Result<Option<LearnerState>> {
        let key = self.learner_key(sender_id);
        let mut conn = self.connection_manager.clone();

        let raw: Option<String> = conn.get(&key).await?;
        match raw {
            Some(data) => {
                let state = serde_json::from_str(&data).map_err(|e| {
                    error!(sender = %mask_sender(sender_id), error = %e, "Failed to deserialize learner state");
                    e
                })?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn create(&self, sender_id: &str) -> Result<LearnerState> {
        let state = LearnerState::new(sender_id);
        let serialized = serde_json::to_string(&state)?;
        let mut conn = self.connection_manager.clone();

        let created: bool = conn.set_nx(self.learner_key(sender_id), serialized).await?;
        if !created {
            return Err(PjotinhaError::LearnerExists {
                sender_id: sender_id.to_string(),
            });
        }

        debug!(sender = %mask_sender(sender_id), "Learner created in Redis");
        Ok(state)
    }

    async fn save(&self, state: &LearnerState) -> Result<()> {
        let serialized = serde_json::to_string(state)?;
        let mut conn = self.connection_manager.clone();

        match conn.set::<_, _, ()>(self.learner_key(&state.sender_id), serialized).await {
            Ok(_) => {
                debug!(sender = %mask_sender(&state.sender_id), stage = %state.stage, "Learner saved to Redis");
                Ok(())
            }
            Err(e) => {
                error!(sender = %mask_sender(&state.sender_id), error = %e, "Failed to save learner to Redis");
                Err(e.into())
            }
        }
    }

    async fn append_entry(&self, entry: &ConversationEntry) -> Result<()> {
        let serialized = serde_json::to_string(entry)?;
        let mut conn = self.connection_manager.clone();
        conn.rpush::<_, _, ()>(self.history_key(&entry.sender_id), serialized).await?;
        Ok(())
    }

    async fn recent_entries(&self, sender_id: &str, limit: usize) -> Result<Vec<ConversationEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.connection_manager.clone();
        let start = -(limit as isize);
        let raw: Vec<String> = conn.lrange(self.history_key(sender_id), start, -1).await?;

        raw.iter()
            .map(|data| serde_json::from_str(data).map_err(PjotinhaError::from))
            .collect()
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_fails_on_invalid_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            prefix: "pjotinha:".to_string(),
        };
        assert!(matches!(RedisStore::new(config).await, Err(PjotinhaError::Redis(_))));
    }
}
