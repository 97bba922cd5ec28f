use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A franchisor's reply to a review. The responder must hold the brand's
/// claim; that check lives in core. Responses carry their own small
/// pending/approved/rejected flow.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub review_id: Uuid,
    pub responder_id: Uuid,
    pub content: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewResponse {
    pub async fn create(
        review_id: Uuid,
        responder_id: Uuid,
        content: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO review_responses (review_id, responder_id, content, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING *
            "#,
        )
        .bind(review_id)
        .bind(responder_id)
        .bind(content)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_review(review_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM review_responses WHERE review_id = $1 ORDER BY created_at DESC",
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
