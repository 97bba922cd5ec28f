use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};

use franscore_core::ServerDeps;

/// Authenticated admin caller. Extract this in moderation handlers.
///
/// Operator identity and login live in the fronting tier; this service
/// only checks the shared ADMIN_API_TOKEN bearer secret. With no token
/// configured, admin routes are closed.
pub struct AdminAuth;

impl FromRequestParts<Arc<ServerDeps>> for AdminAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerDeps>,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_api_token.as_deref() else {
            return Err(reject(
                StatusCode::SERVICE_UNAVAILABLE,
                "admin API not configured",
            ));
        };

        let presented = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");

        if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            Ok(AdminAuth)
        } else {
            Err(reject(StatusCode::UNAUTHORIZED, "invalid admin token"))
        }
    }
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_tokens_match() {
        assert!(constant_time_eq(b"secret-token", b"secret-token"));
    }

    #[test]
    fn different_tokens_do_not_match() {
        assert!(!constant_time_eq(b"secret-token", b"secret-tokeN"));
        assert!(!constant_time_eq(b"short", b"longer-token"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
