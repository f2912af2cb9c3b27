//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod conversation;
pub mod learner;

// Re-export repositories
pub use conversation::ConversationRepository;
pub use learner::LearnerRepository;
