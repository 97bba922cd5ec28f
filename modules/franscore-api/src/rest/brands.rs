use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::warn;

use franscore_common::FranScoreError;
use franscore_core::ServerDeps;
use franscore_domains::brands::Brand;
use franscore_domains::insights::WordFrequency;
use franscore_domains::reviews::{Review, ReviewResponse};

use super::error_response;

/// Count-descending word-cloud entries shown on a brand page.
const WORD_CLOUD_LIMIT: i64 = 20;

#[derive(Serialize)]
pub struct ReviewWithResponses {
    #[serde(flatten)]
    pub review: Review,
    pub responses: Vec<ReviewResponse>,
}

#[derive(Serialize)]
pub struct BrandDetail {
    pub brand: Brand,
    pub reviews: Vec<ReviewWithResponses>,
    pub word_frequencies: Vec<WordFrequency>,
}

/// Brand page payload: aggregates, the approved review set, and the top
/// word-cloud terms. Pending and rejected reviews are never exposed here.
pub async fn brand_detail(
    State(state): State<Arc<ServerDeps>>,
    Path(slug): Path<String>,
) -> Response {
    let brand = match Brand::find_by_slug(&slug, state.pool()).await {
        Ok(Some(brand)) => brand,
        Ok(None) => return error_response(FranScoreError::NotFound(format!("brand {slug}"))),
        Err(e) => return error_response(e.into()),
    };

    let reviews = match Review::approved_for_brand_pool(brand.id, state.pool()).await {
        Ok(reviews) => reviews,
        Err(e) => return error_response(e.into()),
    };

    let mut with_responses = Vec::with_capacity(reviews.len());
    for review in reviews {
        let responses = match ReviewResponse::find_by_review(review.id, state.pool()).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!(error = %e, review_id = %review.id, "Failed to load responses");
                Vec::new()
            }
        };
        with_responses.push(ReviewWithResponses { review, responses });
    }

    let word_frequencies =
        match WordFrequency::top_for_brand(brand.id, WORD_CLOUD_LIMIT, state.pool()).await {
            Ok(words) => words,
            Err(e) => return error_response(e.into()),
        };

    Json(BrandDetail {
        brand,
        reviews: with_responses,
        word_frequencies,
    })
    .into_response()
}
