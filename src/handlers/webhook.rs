//! Webhook HTTP surface
//!
//! The messaging gateway retries anything that is not a 2xx, so every path
//! through `/webhook` answers 200 with a plain-text body, including bad
//! forms, internal errors and panics.

use std::any::Any;
use std::sync::Arc;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use crate::handlers::orchestrator::ConversationOrchestrator;
use crate::i18n::I18n;
use crate::middleware::log_requests;
use crate::utils::errors::Result;
use crate::utils::helpers::mask_sender;

/// Inbound message form as posted by the gateway
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Body", default)]
    pub body: Option<String>,
    #[serde(rename = "From", default)]
    pub from: Option<String>,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub i18n: Arc<I18n>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let apology = state.i18n.t("errors.generic", None);

    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_requests))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(&apology, panic)
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn webhook(State(state): State<AppState>, form: std::result::Result<Form<WebhookForm>, FormRejection>) -> Response {
    let WebhookForm { body, from } = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable webhook form");
            WebhookForm::default()
        }
    };
    let sender = from.unwrap_or_default();
    let body = body.unwrap_or_default();

    let reply = match state.orchestrator.handle_inbound(&sender, &body).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(
                sender = %mask_sender(&sender),
                error = %e,
                severity = %e.severity(),
                recoverable = e.is_recoverable(),
                "Unhandled error while processing inbound message"
            );
            state.i18n.t("errors.generic", None)
        }
    };

    (StatusCode::OK, reply).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn panic_response(apology: &str, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Request handler panicked");

    (StatusCode::OK, apology.to_string()).into_response()
}

/// Serve `app` on `address` until Ctrl-C or SIGTERM
pub async fn serve(address: &str, app: Router) -> Result<()> {
    let listener = TcpListener::bind(address).await?;
    info!(address = %address, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
