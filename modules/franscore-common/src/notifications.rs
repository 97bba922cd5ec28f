use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed notification intents emitted by the core on state transitions.
/// The core never talks to a mail provider directly: it hands one of these
/// to the `Notifier` collaborator, fire-and-forget. Delivery failures are
/// logged and never affect the transition that produced the intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationIntent {
    ReviewApproved {
        author_email: String,
        brand_name: String,
        review_id: Uuid,
    },
    ReviewRejected {
        author_email: String,
        brand_name: String,
        reason: String,
    },
    NewReviewForClaimedBrand {
        owner_email: String,
        brand_name: String,
        preview: String,
        rating: i32,
    },
    PaymentConfirmed {
        user_email: String,
        brand_name: String,
        amount_cents: i64,
        session_id: String,
    },
}

impl NotificationIntent {
    /// Stable kind label for logging and metrics fields.
    pub fn kind(&self) -> &'static str {
        match self {
            NotificationIntent::ReviewApproved { .. } => "review_approved",
            NotificationIntent::ReviewRejected { .. } => "review_rejected",
            NotificationIntent::NewReviewForClaimedBrand { .. } => "new_review_for_claimed_brand",
            NotificationIntent::PaymentConfirmed { .. } => "payment_confirmed",
        }
    }

    /// The address this intent should be delivered to.
    pub fn recipient(&self) -> &str {
        match self {
            NotificationIntent::ReviewApproved { author_email, .. } => author_email,
            NotificationIntent::ReviewRejected { author_email, .. } => author_email,
            NotificationIntent::NewReviewForClaimedBrand { owner_email, .. } => owner_email,
            NotificationIntent::PaymentConfirmed { user_email, .. } => user_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_matches_variant() {
        let intent = NotificationIntent::ReviewRejected {
            author_email: "franchisee@example.com".into(),
            brand_name: "Crust & Co".into(),
            reason: "spam".into(),
        };
        assert_eq!(intent.recipient(), "franchisee@example.com");
        assert_eq!(intent.kind(), "review_rejected");
    }
}
