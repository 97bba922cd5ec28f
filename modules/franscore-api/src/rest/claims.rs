use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use franscore_core::{claims, ServerDeps};

use super::error_response;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub brand_id: Uuid,
    pub user_id: Uuid,
}

/// Start the claim purchase. The session's metadata carries the claim
/// coordinates; ownership itself only changes when the webhook delivers
/// the completed session.
pub async fn create_checkout(
    State(state): State<Arc<ServerDeps>>,
    Json(body): Json<CheckoutRequest>,
) -> Response {
    match claims::create_claim_checkout(&state, body.brand_id, body.user_id).await {
        Ok(handle) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "session_id": handle.session_id,
                "client_secret": handle.client_secret,
            })),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
