use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};

use franscore_core::claims::{self, ClaimOutcome};
use franscore_core::ServerDeps;

use super::error_response;

/// Payment gateway webhook. The raw body is verified against the
/// `Stripe-Signature` header before anything is parsed; a duplicate
/// delivery acknowledges success without reapplying effects so the
/// gateway stops retrying.
pub async fn stripe_webhook(
    State(state): State<Arc<ServerDeps>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match claims::handle_webhook(&state, &body, signature).await {
        Ok(ClaimOutcome::Applied { payment }) => Json(serde_json::json!({
            "received": true,
            "applied": true,
            "payment_id": payment.id,
        }))
        .into_response(),
        Ok(ClaimOutcome::Duplicate { payment }) => Json(serde_json::json!({
            "received": true,
            "applied": false,
            "duplicate": true,
            "payment_id": payment.id,
        }))
        .into_response(),
        Ok(ClaimOutcome::Ignored { event_type }) => Json(serde_json::json!({
            "received": true,
            "ignored": event_type,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
