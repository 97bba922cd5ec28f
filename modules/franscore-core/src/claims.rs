//! Payment-triggered brand claims.
//!
//! The gateway delivers webhooks at-least-once; this processor converts
//! them into exactly-once ownership transitions. The payments table's
//! unique session id is the idempotency guard: the lookup is the first
//! storage operation, and the payment insert plus the brand claim commit
//! in one transaction, both visible or neither.

use tracing::{info, warn};
use uuid::Uuid;

use franscore_common::{FranScoreError, NotificationIntent};
use franscore_domains::brands::Brand;
use franscore_domains::payments::Payment;
use franscore_domains::users::User;

use stripe_client::types::CheckoutSession;
use stripe_client::{webhook, StripeError};

use crate::deps::{CheckoutHandle, CheckoutInput};
use crate::notify::dispatch_detached;
use crate::{Result, ServerDeps};

/// Outcome of one webhook delivery. `Duplicate` is a success, not an
/// error: the desired end state already holds and the gateway must stop
/// retrying.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// First-seen completion: payment recorded, brand claimed.
    Applied { payment: Payment },
    /// Redelivery of an already-applied session. No effects.
    Duplicate { payment: Payment },
    /// Event type this processor does not act on. Acknowledged as-is.
    Ignored { event_type: String },
}

/// Claim coordinates carried in the checkout session's metadata. Absence
/// or malformation is terminal for the event: no retry can fix it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimMetadata {
    pub brand_id: Uuid,
    pub user_id: Uuid,
}

pub fn parse_claim_metadata(session: &CheckoutSession) -> Result<ClaimMetadata> {
    let brand_id = session
        .metadata
        .get("brandId")
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| {
            FranScoreError::Validation("missing or malformed brandId metadata".into())
        })?;
    let user_id = session
        .metadata
        .get("userId")
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| {
            FranScoreError::Validation("missing or malformed userId metadata".into())
        })?;
    Ok(ClaimMetadata { brand_id, user_id })
}

/// Process one raw webhook delivery.
///
/// Fail-closed ordering: signature verification runs before the payload is
/// parsed at all, and nothing below it executes on failure. Signature and
/// metadata errors are permanent (4xx); storage errors surface as
/// retryable (5xx) and redelivery is safe because of the idempotency
/// check.
pub async fn handle_webhook(
    deps: &ServerDeps,
    payload: &[u8],
    signature_header: &str,
) -> Result<ClaimOutcome> {
    let secret = deps
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("STRIPE_WEBHOOK_SECRET not configured"))?;

    let event = webhook::construct_event(payload, signature_header, secret).map_err(|e| match e {
        StripeError::Signature(msg) => FranScoreError::SignatureVerification(msg),
        StripeError::Parse(msg) => FranScoreError::Validation(format!("webhook payload: {msg}")),
        other => FranScoreError::Anyhow(other.into()),
    })?;

    if !event.is_checkout_completed() {
        info!(event_type = %event.event_type, "Acknowledging unhandled webhook event type");
        return Ok(ClaimOutcome::Ignored {
            event_type: event.event_type,
        });
    }

    let session = event
        .checkout_session()
        .map_err(|e| FranScoreError::Validation(e.to_string()))?;
    let meta = parse_claim_metadata(&session)?;

    // Idempotency check is the first storage operation: a row for this
    // session id means the claim already applied, and a retry must succeed
    // regardless of what else changed since.
    {
        let mut conn = deps
            .pool()
            .acquire()
            .await
            .map_err(|e| FranScoreError::Database(e.to_string()))?;
        if let Some(existing) = Payment::find_by_session_id(&session.id, &mut conn).await? {
            info!(session_id = %session.id, "Duplicate webhook delivery, claim already applied");
            return Ok(ClaimOutcome::Duplicate { payment: existing });
        }
    }

    // Metadata must point at real rows; a claim for a nonexistent brand or
    // user is permanently malformed, not retryable.
    let brand = Brand::find_by_id(meta.brand_id, deps.pool())
        .await?
        .ok_or_else(|| {
            FranScoreError::Validation(format!("unknown brand {} in metadata", meta.brand_id))
        })?;
    let user = User::find_by_id(meta.user_id, deps.pool())
        .await?
        .ok_or_else(|| {
            FranScoreError::Validation(format!("unknown user {} in metadata", meta.user_id))
        })?;

    let mut tx = deps
        .pool()
        .begin()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;

    // Re-check under the transaction: a delivery that raced past the
    // first lookup settles here or on the unique constraint below.
    if let Some(existing) = Payment::find_by_session_id(&session.id, &mut tx).await? {
        info!(session_id = %session.id, "Duplicate webhook delivery, claim already applied");
        return Ok(ClaimOutcome::Duplicate { payment: existing });
    }

    Brand::lock_for_update(meta.brand_id, &mut tx)
        .await?
        .ok_or_else(|| FranScoreError::Database("brand row disappeared".into()))?;

    let payment = match Payment::create(
        meta.user_id,
        meta.brand_id,
        &session.id,
        session.payment_intent.as_deref(),
        session.amount_total.unwrap_or(0),
        session.currency.as_deref().unwrap_or("usd"),
        &mut tx,
    )
    .await
    {
        Ok(p) => p,
        Err(e) if is_unique_violation(&e) => {
            // A concurrent delivery of the same session committed between
            // our lookup and insert. Same end state as Duplicate above.
            drop(tx); // rolls back the aborted transaction
            let mut conn = deps
                .pool()
                .acquire()
                .await
                .map_err(|e| FranScoreError::Database(e.to_string()))?;
            let existing = Payment::find_by_session_id(&session.id, &mut conn)
                .await?
                .ok_or_else(|| {
                    FranScoreError::Database("payment vanished after unique violation".into())
                })?;
            warn!(session_id = %session.id, "Lost idempotency race to concurrent delivery");
            return Ok(ClaimOutcome::Duplicate { payment: existing });
        }
        Err(e) => return Err(FranScoreError::Database(e.to_string())),
    };

    Brand::claim(meta.brand_id, meta.user_id, &mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;

    info!(
        brand = %brand.slug,
        user_id = %meta.user_id,
        session_id = %session.id,
        "Brand claimed via completed checkout"
    );

    dispatch_detached(
        deps.notifier.clone(),
        NotificationIntent::PaymentConfirmed {
            user_email: user.email,
            brand_name: brand.name,
            amount_cents: payment.amount_cents,
            session_id: payment.stripe_session_id.clone(),
        },
    );

    Ok(ClaimOutcome::Applied { payment })
}

/// Create a checkout session for claiming a brand. Ownership itself only
/// ever changes through the webhook path above.
pub async fn create_claim_checkout(
    deps: &ServerDeps,
    brand_id: Uuid,
    user_id: Uuid,
) -> Result<CheckoutHandle> {
    let brand = Brand::find_by_id(brand_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("brand {brand_id}")))?;
    if brand.is_claimed {
        return Err(FranScoreError::IllegalState(format!(
            "brand {} is already claimed",
            brand.slug
        )));
    }
    let user = User::find_by_id(user_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::Validation(format!("unknown user {user_id}")))?;

    let return_url = format!(
        "{}/franchisor/claim-success?session_id={{CHECKOUT_SESSION_ID}}",
        deps.config.base_url
    );

    let handle = deps
        .gateway
        .create_checkout_session(CheckoutInput {
            brand_id,
            brand_name: brand.name,
            user_id,
            user_email: user.email,
            return_url,
        })
        .await?;

    Ok(handle)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn session(metadata: &[(&str, &str)]) -> CheckoutSession {
        let raw = serde_json::json!({
            "id": "cs_test_1",
            "amount_total": 49900,
            "currency": "usd",
            "payment_intent": "pi_1",
            "metadata": metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<String, String>>(),
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn well_formed_metadata_parses() {
        let brand = Uuid::new_v4();
        let user = Uuid::new_v4();
        let s = session(&[
            ("brandId", &brand.to_string()),
            ("userId", &user.to_string()),
            ("brandName", "Crust & Co"),
        ]);
        let meta = parse_claim_metadata(&s).unwrap();
        assert_eq!(
            meta,
            ClaimMetadata {
                brand_id: brand,
                user_id: user
            }
        );
    }

    #[test]
    fn missing_user_metadata_is_a_validation_error() {
        let s = session(&[("brandId", &Uuid::new_v4().to_string())]);
        assert!(matches!(
            parse_claim_metadata(&s),
            Err(FranScoreError::Validation(_))
        ));
    }

    #[test]
    fn non_uuid_metadata_is_a_validation_error() {
        let s = session(&[("brandId", "42"), ("userId", "someone")]);
        assert!(matches!(
            parse_claim_metadata(&s),
            Err(FranScoreError::Validation(_))
        ));
    }
}
