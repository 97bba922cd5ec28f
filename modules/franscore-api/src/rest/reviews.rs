use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use franscore_core::{moderation, ServerDeps};

use super::error_response;

#[derive(Deserialize)]
pub struct SubmitReviewRequest {
    pub brand_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub overall_rating: i32,
    pub support_rating: Option<i32>,
    pub training_rating: Option<i32>,
    pub profitability_rating: Option<i32>,
    pub culture_rating: Option<i32>,
    pub years_as_franchisee: Option<i32>,
}

pub async fn submit_review(
    State(state): State<Arc<ServerDeps>>,
    Json(body): Json<SubmitReviewRequest>,
) -> Response {
    let req = moderation::SubmitReview {
        brand_id: body.brand_id,
        author_id: body.author_id,
        title: body.title,
        content: body.content,
        overall_rating: body.overall_rating,
        support_rating: body.support_rating,
        training_rating: body.training_rating,
        profitability_rating: body.profitability_rating,
        culture_rating: body.culture_rating,
        years_as_franchisee: body.years_as_franchisee,
    };

    match moderation::submit_review(&state, req).await {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
pub struct RespondRequest {
    pub responder_id: Uuid,
    pub content: String,
}

pub async fn respond(
    State(state): State<Arc<ServerDeps>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> Response {
    match moderation::respond_to_review(&state, id, body.responder_id, &body.content).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub reporter_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}

pub async fn report(
    State(state): State<Arc<ServerDeps>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReportRequest>,
) -> Response {
    match moderation::report_review(
        &state,
        id,
        body.reporter_id,
        &body.reason,
        body.description.as_deref(),
    )
    .await
    {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}
