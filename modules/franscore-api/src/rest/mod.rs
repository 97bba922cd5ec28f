pub mod admin;
pub mod brands;
pub mod claims;
pub mod reviews;
pub mod webhook;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use franscore_common::FranScoreError;

/// Map a core error onto an HTTP response. Permanent failures get 4xx so
/// callers (including the payment gateway's retry loop) stop retrying;
/// storage failures get 500 so retries happen; retries are safe because
/// every mutating operation is idempotent or guarded.
pub fn error_response(err: FranScoreError) -> Response {
    let (status, message) = match &err {
        FranScoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        FranScoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        FranScoreError::Unauthorized(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        FranScoreError::IllegalState(msg) => (StatusCode::CONFLICT, msg.clone()),
        FranScoreError::SignatureVerification(_) => {
            (StatusCode::BAD_REQUEST, "invalid signature".to_string())
        }
        FranScoreError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
        FranScoreError::Database(_) | FranScoreError::Anyhow(_) => {
            warn!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    };

    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_failures_map_to_4xx() {
        assert_eq!(
            error_response(FranScoreError::Validation("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(FranScoreError::NotFound("gone".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(FranScoreError::Unauthorized("no".into())).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_response(FranScoreError::IllegalState("done".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_response(FranScoreError::SignatureVerification("v1".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn transient_failures_map_to_500_for_gateway_redelivery() {
        assert_eq!(
            error_response(FranScoreError::Database("timeout".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let resp = error_response(FranScoreError::Database(
            "connect to db.internal:5432 refused".into(),
        ));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
