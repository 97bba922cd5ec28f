use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use franscore_common::ModerationAssessment;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
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
    pub status: String,
    /// Parallel marker set by user reports. Independent of `status`.
    pub is_flagged: bool,
    pub moderation_category: String,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub ai_flags: serde_json::Value,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Insert a freshly submitted review. Status is always `pending`: the
    /// classifier verdict is attached as advisory metadata and cannot
    /// approve anything on its own.
    pub async fn create(
        brand_id: Uuid,
        author_id: Uuid,
        title: &str,
        content: &str,
        overall_rating: i32,
        support_rating: Option<i32>,
        training_rating: Option<i32>,
        profitability_rating: Option<i32>,
        culture_rating: Option<i32>,
        years_as_franchisee: Option<i32>,
        assessment: &ModerationAssessment,
        is_verified: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO reviews (
                brand_id, author_id, title, content,
                overall_rating, support_rating, training_rating,
                profitability_rating, culture_rating, years_as_franchisee,
                status, moderation_category, sentiment, sentiment_score,
                ai_flags, is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    'pending', $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(brand_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(overall_rating)
        .bind(support_rating)
        .bind(training_rating)
        .bind(profitability_rating)
        .bind(culture_rating)
        .bind(years_as_franchisee)
        .bind(assessment.category.as_str())
        .bind(assessment.sentiment.as_str())
        .bind(assessment.sentiment_score)
        .bind(serde_json::to_value(&assessment.flags)?)
        .bind(is_verified)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Lock the review row for the surrounding moderation transaction so
    /// two moderators deciding the same review serialize: the loser sees
    /// the winner's terminal status and fails the pending check.
    pub async fn lock_for_update(id: Uuid, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM reviews WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn set_status(id: Uuid, status: &str, conn: &mut PgConnection) -> Result<()> {
        sqlx::query("UPDATE reviews SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn mark_flagged(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE reviews SET is_flagged = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// The full approved set for a brand, the sole input to aggregate
    /// recomputation. Takes a connection so it can read under the brand
    /// row lock inside the moderation transaction.
    pub async fn approved_for_brand(brand_id: Uuid, conn: &mut PgConnection) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reviews WHERE brand_id = $1 AND status = 'approved' ORDER BY created_at DESC",
        )
        .bind(brand_id)
        .fetch_all(conn)
        .await
        .map_err(Into::into)
    }

    pub async fn approved_for_brand_pool(brand_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reviews WHERE brand_id = $1 AND status = 'approved' ORDER BY created_at DESC",
        )
        .bind(brand_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Moderation queue, newest first.
    pub async fn find_by_status(status: &str, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reviews WHERE status = $1 ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Submissions by an author inside the trailing window. Counted in
    /// Postgres so the throttle holds across server instances.
    pub async fn count_recent_by_author(
        author_id: Uuid,
        window: Duration,
        pool: &PgPool,
    ) -> Result<i64> {
        let since = Utc::now() - window;
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE author_id = $1 AND created_at > $2",
        )
        .bind(author_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
