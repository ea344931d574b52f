//! HTTP ingress routes

mod command_routes;
mod event_routes;

use axum::{routing::post, Router};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/command", post(command_routes::submit_command))
        .route("/api/events", post(event_routes::ingest_event))
}
