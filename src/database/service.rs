//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{ConversationRepository, DatabasePool, LearnerRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub learners: LearnerRepository,
    pub conversations: ConversationRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            learners: LearnerRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}
