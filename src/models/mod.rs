//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod conversation;
pub mod learner;

// Re-export commonly used models
pub use conversation::{ConversationEntry, Role};
pub use learner::{AnswerLetter, LearnerProfile, LearnerState, LessonCursor, PendingQuestion};
