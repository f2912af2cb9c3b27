//! In-process store for tests and local runs

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::models::{ConversationEntry, LearnerState};
use crate::utils::errors::{PjotinhaError, Result};
use super::LearnerStore;

#[derive(Default)]
pub struct MemoryStore {
    learners: RwLock<HashMap<String, LearnerState>>,
    history: RwLock<HashMap<String, Vec<ConversationEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of log entries across all senders
    pub async fn entry_count(&self) -> usize {
        self.history.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl LearnerStore for MemoryStore {
    async fn get(&self, sender_id: &str) -> Result<Option<LearnerState>> {
        Ok(self.learners.read().await.get(sender_id).cloned())
    }

    async fn create(&self, sender_id: &str) -> Result<LearnerState> {
        let mut learners = self.learners.write().await;
        if learners.contains_key(sender_id) {
            return Err(PjotinhaError::LearnerExists {
                sender_id: sender_id.to_string(),
            });
        }

        let state = LearnerState::new(sender_id);
        learners.insert(sender_id.to_string(), state.clone());
        Ok(state)
    }

    async fn save(&self, state: &LearnerState) -> Result<()> {
        self.learners
            .write()
            .await
            .insert(state.sender_id.clone(), state.clone());
        Ok(())
    }

    async fn append_entry(&self, entry: &ConversationEntry) -> Result<()> {
        self.history
            .write()
            .await
            .entry(entry.sender_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn recent_entries(&self, sender_id: &str, limit: usize) -> Result<Vec<ConversationEntry>> {
        let history = self.history.read().await;
        let entries = history.get(sender_id).map(Vec::as_slice).unwrap_or_default();
        let skip = entries.len().saturating_sub(limit);
        Ok(entries[skip..].to_vec())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Stage;

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let store = MemoryStore::new();
        let first = store.get_or_create("+1555").await.unwrap();
        assert_eq!(first.stage, Stage::Start);

        store.save(&first.clone().with_stage(Stage::Ready)).await.unwrap();
        let second = store.get_or_create("+1555").await.unwrap();
        assert_eq!(second.stage, Stage::Ready);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let store = MemoryStore::new();
        store.create("+1555").await.unwrap();
        assert!(matches!(
            store.create("+1555").await,
            Err(PjotinhaError::LearnerExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_recent_entries_window() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .append_entry(&ConversationEntry::learner("+1555", format!("msg {}", i)))
                .await
                .unwrap();
        }
        store.append_entry(&ConversationEntry::learner("+1666", "other")).await.unwrap();

        let recent = store.recent_entries("+1555", 3).await.unwrap();
        let texts: Vec<&str> = recent.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["msg 2", "msg 3", "msg 4"]);
        assert!(store.recent_entries("+1777", 3).await.unwrap().is_empty());
        assert_eq!(store.entry_count().await, 6);
    }
}
