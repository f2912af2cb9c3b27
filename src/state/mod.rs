//! State management module
//!
//! This module handles the learner conversation state machine

pub mod stage;
pub mod transitions;

// Re-export commonly used state components
pub use stage::{ProfileField, Stage};
pub use transitions::{next_profile_stage, route, CoursePlan, Keywords, Route};
