use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Append-only audit trail of moderation decisions. Rows are never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ModerationLog {
    pub id: Uuid,
    pub review_id: Uuid,
    pub moderator_id: Uuid,
    pub action: String,
    pub previous_status: String,
    pub new_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ModerationLog {
    /// Append an audit row. Runs inside the moderation transaction so the
    /// status change and its log entry commit together.
    pub async fn append(
        review_id: Uuid,
        moderator_id: Uuid,
        action: &str,
        previous_status: &str,
        new_status: &str,
        notes: Option<&str>,
        conn: &mut PgConnection,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO moderation_logs (
                review_id, moderator_id, action, previous_status, new_status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(review_id)
        .bind(moderator_id)
        .bind(action)
        .bind(previous_status)
        .bind(new_status)
        .bind(notes)
        .fetch_one(conn)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_review(review_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM moderation_logs WHERE review_id = $1 ORDER BY created_at ASC",
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
