use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub website: Option<String>,
    pub is_claimed: bool,
    pub claimed_by_id: Option<Uuid>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub total_reviews: i32,
    pub average_rating: f64,
    pub z_score: f64,
    pub support_score: f64,
    pub training_score: f64,
    pub profitability_score: f64,
    pub culture_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The five persisted score fields plus the approved-review count.
/// Always written together in one statement; they are a pure function of
/// the approved review set and must never drift from it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrandAggregates {
    pub total_reviews: i32,
    pub average_rating: f64,
    pub z_score: f64,
    pub support_score: f64,
    pub training_score: f64,
    pub profitability_score: f64,
    pub culture_score: f64,
}

impl Brand {
    pub async fn create(
        name: &str,
        slug: &str,
        description: Option<&str>,
        category: Option<&str>,
        website: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO brands (name, slug, description, category, website)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(category)
        .bind(website)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Lock the brand row for the remainder of the surrounding transaction.
    /// Concurrent aggregate recomputes and claim attempts for the same brand
    /// serialize on this lock.
    pub async fn lock_for_update(id: Uuid, conn: &mut PgConnection) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM brands WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    /// Persist recomputed aggregates in a single atomic update.
    pub async fn update_aggregates(
        id: Uuid,
        agg: &BrandAggregates,
        conn: &mut PgConnection,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE brands SET
                total_reviews = $2,
                average_rating = $3,
                z_score = $4,
                support_score = $5,
                training_score = $6,
                profitability_score = $7,
                culture_score = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(agg.total_reviews)
        .bind(agg.average_rating)
        .bind(agg.z_score)
        .bind(agg.support_score)
        .bind(agg.training_score)
        .bind(agg.profitability_score)
        .bind(agg.culture_score)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Mark the brand claimed. Runs inside the claim transaction alongside
    /// the payment insert; both commit together or not at all.
    pub async fn claim(id: Uuid, user_id: Uuid, conn: &mut PgConnection) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE brands SET
                is_claimed = TRUE,
                claimed_by_id = $2,
                claimed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(())
    }
}
