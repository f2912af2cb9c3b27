//! Error handling for Pjotinha
//!
//! This module defines the main error type used throughout the application
//! and the component errors returned at the completion, extraction and
//! content boundaries. Fallback selection happens in the orchestrator, so
//! these errors are values to be matched, not things to be swallowed.

use std::time::Duration;
use thiserror::Error;

/// Main error type for Pjotinha
#[derive(Error, Debug)]
pub enum PjotinhaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion error: {0}")]
    Llm(#[from] LlmError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    #[error("Learner not found: {sender_id}")]
    LearnerNotFound { sender_id: String },

    #[error("Learner already exists: {sender_id}")]
    LearnerExists { sender_id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Text-completion capability errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Completion client is disabled (no API key configured)")]
    Disabled,

    #[error("Completion request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Completion service unavailable: {0}")]
    Unavailable(String),

    #[error("Completion request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid completion response: {0}")]
    InvalidResponse(String),

    #[error("Completion response was empty")]
    EmptyCompletion,
}

/// Lesson and quiz content errors
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Module {module} is not available: {reason}")]
    ModuleUnavailable { module: u32, reason: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Lesson part {part} out of range (1..={parts})")]
    PartOutOfRange { part: u32, parts: u32 },

    #[error("Quiz generation failed: {0}")]
    QuizGeneration(String),

    #[error("Completion error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Profile field extraction errors
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Completion error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed extraction result: {0}")]
    Malformed(String),
}

/// Result type alias for Pjotinha operations
pub type Result<T> = std::result::Result<T, PjotinhaError>;

/// Result type alias for completion operations
pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Result type alias for content operations
pub type ContentResult<T> = std::result::Result<T, ContentError>;

impl PjotinhaError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PjotinhaError::Database(_) => true,
            PjotinhaError::Migration(_) => false,
            PjotinhaError::Redis(_) => true,
            PjotinhaError::Http(_) => true,
            PjotinhaError::Llm(_) => true,
            PjotinhaError::Content(_) => true,
            PjotinhaError::Extraction(_) => true,
            PjotinhaError::Config(_) => false,
            PjotinhaError::InvalidStage(_) => false,
            PjotinhaError::LearnerNotFound { .. } => false,
            PjotinhaError::LearnerExists { .. } => false,
            PjotinhaError::Serialization(_) => false,
            PjotinhaError::Io(_) => true,
            PjotinhaError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PjotinhaError::Migration(_) => ErrorSeverity::Critical,
            PjotinhaError::Config(_) => ErrorSeverity::Critical,
            PjotinhaError::Database(_) => ErrorSeverity::Error,
            PjotinhaError::Redis(_) => ErrorSeverity::Error,
            PjotinhaError::Llm(_) => ErrorSeverity::Warning,
            PjotinhaError::Content(_) => ErrorSeverity::Warning,
            PjotinhaError::Extraction(_) => ErrorSeverity::Warning,
            PjotinhaError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

impl LlmError {
    /// Classify a reqwest failure the same way for every completion backend
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            LlmError::Timeout(timeout)
        } else if error.is_connect() {
            LlmError::Unavailable(error.to_string())
        } else if error.is_decode() {
            LlmError::InvalidResponse(error.to_string())
        } else {
            LlmError::RequestFailed(error.to_string())
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
