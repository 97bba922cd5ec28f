use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use franscore_common::{Config, ModerationAssessment, NotificationIntent, TermSentiment};

/// AI content classifier. Advisory only: its verdict is attached to a
/// review as metadata and never changes moderation status by itself.
/// Callers substitute `ModerationAssessment::fallback()` on failure.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, title: &str, content: &str) -> Result<ModerationAssessment>;
    async fn extract_terms(&self, content: &str) -> Result<Vec<TermSentiment>>;
}

/// Outbound notification delivery. Always invoked fire-and-forget via
/// `notify::dispatch_detached`; a failing mailer never blocks or rolls
/// back a state transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, intent: &NotificationIntent) -> Result<()>;
}

/// What the claim flow needs from the payment provider: a checkout session
/// carrying enough metadata for the webhook to apply ownership later.
/// Webhook *verification* is pure logic and does not go through this trait.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, input: CheckoutInput) -> Result<CheckoutHandle>;
}

#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub brand_id: Uuid,
    pub brand_name: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub return_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutHandle {
    pub session_id: String,
    pub client_secret: Option<String>,
}

/// Central dependency container passed to all handlers and operations.
/// Collaborators are interface-typed so tests can swap in fakes.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub classifier: Arc<dyn Classifier>,
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub config: Config,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        classifier: Arc<dyn Classifier>,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PaymentGateway>,
        config: Config,
    ) -> Self {
        Self {
            db_pool,
            classifier,
            notifier,
            gateway,
            config,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db_pool
    }
}
