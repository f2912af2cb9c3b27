//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Pjotinha application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{PjotinhaError, Result};
use crate::utils::helpers::mask_sender;

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let initialized = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stdout))
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init()
    };

    initialized.map_err(|e| PjotinhaError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an inbound learner message
pub fn log_inbound_message(sender_id: &str, stage: &str, length: usize) {
    info!(
        sender = %mask_sender(sender_id),
        stage = stage,
        length = length,
        "Inbound message received"
    );
}

/// Log a stage transition
pub fn log_stage_transition(sender_id: &str, from: &str, to: &str) {
    if from == to {
        debug!(sender = %mask_sender(sender_id), stage = from, "Stage unchanged");
    } else {
        info!(
            sender = %mask_sender(sender_id),
            from = from,
            to = to,
            "Stage transition"
        );
    }
}

/// Log that a component substituted its fallback value
pub fn log_fallback(component: &str, sender_id: &str, error: &str) {
    warn!(
        component = component,
        sender = %mask_sender(sender_id),
        error = error,
        "Falling back after external capability failure"
    );
}

/// Log a persistence failure; the learner still receives the computed reply
pub fn log_persistence_failure(sender_id: &str, operation: &str, error: &str) {
    error!(
        sender = %mask_sender(sender_id),
        operation = operation,
        error = error,
        "Persistence operation failed"
    );
}

/// Log completion API calls
pub fn log_completion_call(model: &str, turns: usize, duration_ms: u64, success: bool) {
    if success {
        debug!(
            model = model,
            turns = turns,
            duration_ms = duration_ms,
            "Completion call finished"
        );
    } else {
        warn!(
            model = model,
            turns = turns,
            duration_ms = duration_ms,
            "Completion call failed"
        );
    }
}
