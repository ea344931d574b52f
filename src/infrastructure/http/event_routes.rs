//! World event ingress
//!
//! The protocol client POSTs every world happening here. Correlated
//! replies are fed to their pending world query; everything else goes to
//! the notification dispatcher. The response never waits on deliveries.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::domain::events::WorldEvent;
use crate::infrastructure::state::AppState;

/// Accept one world event
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<WorldEvent>,
) -> StatusCode {
    if state.world.resolve_reply(&event) {
        return StatusCode::ACCEPTED;
    }

    state.dispatcher.dispatch_event(&event);
    StatusCode::ACCEPTED
}
