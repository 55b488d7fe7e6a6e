//! Webhook handler

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use super::GatewayState;
use crate::update::Update;

/// Accept an update and process it on its own task. The Bot API only needs
/// to know the delivery arrived; failures are handled inside the dispatcher.
pub async fn webhook_handler(
    State(state): State<GatewayState>,
    Json(update): Json<Update>,
) -> StatusCode {
    debug!(update_id = update.update_id, kind = update.kind(), "Update received");
    let dispatcher = std::sync::Arc::clone(state.dispatcher());
    tokio::spawn(async move {
        // Unclaimed updates are normal (plain chatter, foreign bot commands).
        let _ = dispatcher.dispatch(update).await;
    });
    StatusCode::OK
}
