//! Middleware module
//!
//! This module contains HTTP middleware for the webhook server

pub mod logging;

// Re-export middleware components
pub use logging::log_requests;
