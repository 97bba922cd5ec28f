//! Notification rendering and dispatch.
//!
//! Delivery is best-effort by contract: a slow or failing mail provider
//! must never cause a moderation decision or a webhook to time out or
//! roll back. Failures land in the operational log, nowhere else.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use franscore_common::NotificationIntent;
use postmark_client::{OutboundEmail, PostmarkClient};

use crate::Notifier;

/// Hand an intent to the notifier on a detached task. Returns immediately.
pub fn dispatch_detached(notifier: Arc<dyn Notifier>, intent: NotificationIntent) {
    tokio::spawn(async move {
        if let Err(e) = notifier.deliver(&intent).await {
            warn!(
                error = %e,
                kind = intent.kind(),
                recipient = %intent.recipient(),
                "Notification delivery failed"
            );
        }
    });
}

/// Production notifier: renders intents to plain-text email and sends via
/// Postmark.
pub struct PostmarkNotifier {
    client: PostmarkClient,
    from: String,
}

impl PostmarkNotifier {
    pub fn new(client: PostmarkClient, from: String) -> Self {
        Self { client, from }
    }
}

#[async_trait]
impl Notifier for PostmarkNotifier {
    async fn deliver(&self, intent: &NotificationIntent) -> Result<()> {
        let (subject, body) = render(intent);
        self.client
            .send_email(&OutboundEmail {
                from: self.from.clone(),
                to: intent.recipient().to_string(),
                subject,
                text_body: body,
            })
            .await?;
        Ok(())
    }
}

/// Stands in when POSTMARK_API_TOKEN is missing. Every delivery attempt
/// fails and is logged by the dispatcher; nothing else is affected.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn deliver(&self, _intent: &NotificationIntent) -> Result<()> {
        Err(anyhow::anyhow!("mail provider not configured"))
    }
}

/// Render an intent to (subject, plain-text body).
pub fn render(intent: &NotificationIntent) -> (String, String) {
    match intent {
        NotificationIntent::ReviewApproved {
            brand_name,
            review_id,
            ..
        } => (
            format!("Your review of {brand_name} is live"),
            format!(
                "Good news: your review of {brand_name} passed moderation and is now \
                 visible to other franchisees.\n\nReview reference: {review_id}\n"
            ),
        ),
        NotificationIntent::ReviewRejected {
            brand_name, reason, ..
        } => (
            format!("Your review of {brand_name} was not published"),
            format!(
                "Your review of {brand_name} was reviewed by our moderation team and \
                 could not be published.\n\nReason: {reason}\n\nYou are welcome to \
                 submit a revised review.\n"
            ),
        ),
        NotificationIntent::NewReviewForClaimedBrand {
            brand_name,
            preview,
            rating,
            ..
        } => (
            format!("New {rating}-star review for {brand_name}"),
            format!(
                "A new review of {brand_name} was just published:\n\n\
                 \"{preview}\"\n\nLog in to your franchisor dashboard to respond.\n"
            ),
        ),
        NotificationIntent::PaymentConfirmed {
            brand_name,
            amount_cents,
            session_id,
            ..
        } => (
            format!("Payment confirmed: you now manage {brand_name}"),
            format!(
                "Your payment of {} was received and your claim on {brand_name} is \
                 active.\n\nReceipt reference: {session_id}\n",
                format_amount(*amount_cents)
            ),
        ),
    }
}

fn format_amount(cents: i64) -> String {
    format!("${:.2}", cents as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn approved_email_names_the_brand() {
        let (subject, body) = render(&NotificationIntent::ReviewApproved {
            author_email: "a@example.com".into(),
            brand_name: "Crust & Co".into(),
            review_id: Uuid::nil(),
        });
        assert!(subject.contains("Crust & Co"));
        assert!(body.contains("passed moderation"));
    }

    #[test]
    fn rejected_email_carries_the_reason() {
        let (_, body) = render(&NotificationIntent::ReviewRejected {
            author_email: "a@example.com".into(),
            brand_name: "Crust & Co".into(),
            reason: "promotional content".into(),
        });
        assert!(body.contains("promotional content"));
    }

    #[test]
    fn owner_email_includes_preview_and_rating() {
        let (subject, body) = render(&NotificationIntent::NewReviewForClaimedBrand {
            owner_email: "owner@example.com".into(),
            brand_name: "Crust & Co".into(),
            preview: "Training was thorough".into(),
            rating: 4,
        });
        assert!(subject.contains("4-star"));
        assert!(body.contains("Training was thorough"));
    }

    struct RecordingNotifier {
        sent: tokio::sync::mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, intent: &NotificationIntent) -> Result<()> {
            self.sent.send(intent.kind().to_string()).ok();
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn deliver(&self, _intent: &NotificationIntent) -> Result<()> {
            Err(anyhow::anyhow!("mailer down"))
        }
    }

    fn payment_intent() -> NotificationIntent {
        NotificationIntent::PaymentConfirmed {
            user_email: "u@example.com".into(),
            brand_name: "Crust & Co".into(),
            amount_cents: 49900,
            session_id: "cs_1".into(),
        }
    }

    #[tokio::test]
    async fn detached_dispatch_delivers() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        dispatch_detached(Arc::new(RecordingNotifier { sent: tx }), payment_intent());
        let kind = rx.recv().await.unwrap();
        assert_eq!(kind, "payment_confirmed");
    }

    #[tokio::test]
    async fn detached_dispatch_swallows_delivery_failures() {
        // The spawned task logs and dies quietly; the caller is unaffected.
        dispatch_detached(Arc::new(FailingNotifier), payment_intent());
        tokio::task::yield_now().await;
    }

    #[test]
    fn amounts_render_in_dollars() {
        let (_, body) = render(&NotificationIntent::PaymentConfirmed {
            user_email: "u@example.com".into(),
            brand_name: "Crust & Co".into(),
            amount_cents: 49900,
            session_id: "cs_1".into(),
        });
        assert!(body.contains("$499.00"));
    }
}
