//! Webhook endpoint receiving messaging-platform updates.
//!
//! - `POST /telegram/webhook` - decode an update, run the command, ack
//! - `GET /health` - liveness probe
//!
//! The platform only needs a 200 to consider the update delivered, so the
//! route always acks; replies travel through the messenger, not this
//! response.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::telegram::Update;
use crate::application::CommandHandler;

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<CommandHandler>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/telegram/webhook", post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn receive_update(State(state): State<AppState>, Json(update): Json<Update>) -> &'static str {
    match update.into_inbound() {
        Some(inbound) => state.handler.handle(inbound).await,
        None => tracing::debug!("update without a text message, acked and dropped"),
    }
    "OK"
}

async fn health() -> &'static str {
    "ok"
}
