use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Per-brand term-sentiment counter behind the insight word cloud.
/// Counts only ever grow: rejecting or removing a review does not
/// decrement (known asymmetry, kept).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WordFrequency {
    pub id: Uuid,
    pub brand_id: Uuid,
    pub word: String,
    pub count: i32,
    pub sentiment: String,
    pub last_updated: DateTime<Utc>,
}

impl WordFrequency {
    /// Upsert one observed term: insert at count 1, or increment and
    /// record the latest observed sentiment for the pair.
    pub async fn record_term(
        brand_id: Uuid,
        word: &str,
        sentiment: &str,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO word_frequencies (brand_id, word, count, sentiment)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (brand_id, word) DO UPDATE SET
                count = word_frequencies.count + 1,
                sentiment = EXCLUDED.sentiment,
                last_updated = NOW()
            RETURNING *
            "#,
        )
        .bind(brand_id)
        .bind(word)
        .bind(sentiment)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    pub async fn top_for_brand(brand_id: Uuid, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM word_frequencies WHERE brand_id = $1 ORDER BY count DESC LIMIT $2",
        )
        .bind(brand_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
