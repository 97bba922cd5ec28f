use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use franscore_common::{FranScoreError, ModerationAction, ReviewStatus};
use franscore_core::{moderation, ServerDeps};
use franscore_domains::reviews::Review;

use super::error_response;
use crate::auth::AdminAuth;

#[derive(Deserialize)]
pub struct QueueQuery {
    pub status: Option<String>,
}

/// Moderation queue, defaulting to the pending pile.
pub async fn moderation_queue(
    _admin: AdminAuth,
    State(state): State<Arc<ServerDeps>>,
    Query(query): Query<QueueQuery>,
) -> Response {
    let status = query.status.unwrap_or_else(|| "pending".to_string());
    if ReviewStatus::parse(&status).is_none() {
        return error_response(FranScoreError::Validation(format!(
            "unknown review status {status:?}"
        )));
    }

    match Review::find_by_status(&status, state.pool()).await {
        Ok(reviews) => Json(serde_json::json!({ "reviews": reviews })).into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub action: ModerationAction,
    pub moderator_id: Uuid,
    pub notes: Option<String>,
}

pub async fn moderate_review(
    _admin: AdminAuth,
    State(state): State<Arc<ServerDeps>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ModerateRequest>,
) -> Response {
    let req = moderation::ModerateRequest {
        review_id: id,
        action: body.action,
        moderator_id: body.moderator_id,
        notes: body.notes,
    };

    match moderation::moderate(&state, req).await {
        Ok(review) => Json(review).into_response(),
        Err(e) => error_response(e),
    }
}
