//! Handlers module
//!
//! This module contains the inbound message handling:
//! - The conversation orchestrator driving the learner state machine
//! - The webhook HTTP surface in front of it

pub mod orchestrator;
pub mod webhook;

// Re-export commonly used handler components
pub use orchestrator::ConversationOrchestrator;
pub use webhook::{router, serve, AppState, WebhookForm};
