//! Pjotinha WhatsApp Bot
//!
//! Main application entry point

use anyhow::Context;
use tracing::info;

use pjotinha::{build_state, config::Settings, handlers, utils::logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", pjotinha::info());
    info!(backend = ?settings.storage.backend, "Initializing learner store...");

    let state = build_state(&settings).await?;
    let app = handlers::router(state);

    info!("Pjotinha is ready!");
    handlers::serve(&settings.bind_address(), app).await?;

    info!("Pjotinha has been shut down.");
    Ok(())
}
