//! Production `PaymentGateway` backed by the Stripe client, plus the
//! disabled fallback used when payment credentials are not configured.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use stripe_client::{CheckoutSessionInput, StripeClient};

use crate::deps::{CheckoutHandle, CheckoutInput};
use crate::PaymentGateway;

pub struct StripeCheckout {
    client: StripeClient,
    price_id: String,
}

impl StripeCheckout {
    pub fn new(client: StripeClient, price_id: String) -> Self {
        Self { client, price_id }
    }
}

#[async_trait]
impl PaymentGateway for StripeCheckout {
    async fn create_checkout_session(&self, input: CheckoutInput) -> Result<CheckoutHandle> {
        let session = self
            .client
            .create_checkout_session(&CheckoutSessionInput {
                price_id: self.price_id.clone(),
                customer_email: input.user_email,
                return_url: input.return_url,
                metadata: vec![
                    ("brandId".to_string(), input.brand_id.to_string()),
                    ("userId".to_string(), input.user_id.to_string()),
                    ("brandName".to_string(), input.brand_name),
                ],
            })
            .await?;

        Ok(CheckoutHandle {
            session_id: session.id,
            client_secret: session.client_secret,
        })
    }
}

/// Stands in when STRIPE_SECRET_KEY or the claim price id is missing. The
/// rest of the platform keeps working; only checkout creation fails, with
/// a clear message.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_checkout_session(&self, _input: CheckoutInput) -> Result<CheckoutHandle> {
        Err(anyhow!("payment gateway not configured"))
    }
}
