use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// One completed gateway checkout. `stripe_session_id` is UNIQUE: the
/// presence of a row for a session id is the idempotency guard for claim
/// processing. Rows are immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub brand_id: Uuid,
    pub stripe_session_id: String,
    pub stripe_payment_intent_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Insert inside the claim transaction. A unique violation here means a
    /// concurrent delivery of the same session won the race; the caller
    /// treats that exactly like the row having existed up front.
    pub async fn create(
        user_id: Uuid,
        brand_id: Uuid,
        stripe_session_id: &str,
        stripe_payment_intent_id: Option<&str>,
        amount_cents: i64,
        currency: &str,
        conn: &mut PgConnection,
    ) -> std::result::Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO payments (
                user_id, brand_id, stripe_session_id,
                stripe_payment_intent_id, amount_cents, currency, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'completed')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(brand_id)
        .bind(stripe_session_id)
        .bind(stripe_payment_intent_id)
        .bind(amount_cents)
        .bind(currency)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_session_id(
        session_id: &str,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM payments WHERE stripe_session_id = $1")
            .bind(session_id)
            .fetch_optional(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_user(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
