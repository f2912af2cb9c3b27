//! Internationalization module
//!
//! Every learner-visible message and every completion prompt comes from
//! the catalog managed here.

pub mod loader;

// Re-export commonly used i18n components
pub use loader::{I18n, TranslationParams};
