//! Command ingress
//!
//! The protocol client relays each in-world command here as the encoded
//! key-value body; the response body is the encoded result map. Every
//! submission gets exactly one result, including the ones that never
//! reach a handler.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};

use crate::application::dto::CommandInvocation;
use crate::domain::value_objects::KeyValueMessage;
use crate::infrastructure::state::AppState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn result_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(FORM_CONTENT_TYPE),
    );
    headers
}

/// Render a result for a submission that failed before reaching the router.
fn early_failure(message: &KeyValueMessage, error_kind: &'static str) -> KeyValueMessage {
    let mut result = KeyValueMessage::new();
    if let Some(name) = message.get("command") {
        result.push("command", name);
    }
    result.push("success", "false");
    result.push("error", error_kind);
    result
}

/// Accept one command submission
pub async fn submit_command(
    State(state): State<Arc<AppState>>,
    body: String,
) -> (HeaderMap, String) {
    let message = KeyValueMessage::decode(&body);

    let Some(reference) = message.get("group") else {
        tracing::warn!("Command submitted without a group");
        return (result_headers(), early_failure(&message, "ValidationError").encode());
    };

    let Some(group) = state.directory.resolve(reference) else {
        tracing::warn!("Command submitted for unknown group {}", reference);
        return (result_headers(), early_failure(&message, "NotFound").encode());
    };

    let invocation = CommandInvocation::new(group.id, message);
    let context = state.command_context(group, invocation);
    let result = state.router.dispatch(context).await;
    (result_headers(), result.encode())
}
