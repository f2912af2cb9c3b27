//! Conversation log model

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::utils::errors::PjotinhaError;

/// Who authored a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Assistant => "assistant",
        }
    }

    /// Role name used by chat-completion APIs
    pub fn completion_role(&self) -> &'static str {
        match self {
            Role::Learner => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PjotinhaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learner" | "aluno" => Ok(Role::Learner),
            "assistant" | "IA" | "ia" => Ok(Role::Assistant),
            other => Err(PjotinhaError::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Immutable, append-only log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub sender_id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationEntry {
    pub fn new(sender_id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn learner(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(sender_id, Role::Learner, text)
    }

    pub fn assistant(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(sender_id, Role::Assistant, text)
    }
}
