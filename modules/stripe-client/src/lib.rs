pub mod error;
pub mod types;
pub mod webhook;

pub use error::{Result, StripeError};
pub use types::{
    CheckoutSession, CheckoutSessionInput, Event, CHECKOUT_SESSION_COMPLETED,
};

const BASE_URL: &str = "https://api.stripe.com/v1";

pub struct StripeClient {
    client: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Create an embedded checkout session. The Stripe API is
    /// form-encoded; nested fields use bracket notation.
    pub async fn create_checkout_session(
        &self,
        input: &CheckoutSessionInput,
    ) -> Result<CheckoutSession> {
        let mut form: Vec<(String, String)> = vec![
            ("ui_mode".into(), "embedded".into()),
            ("mode".into(), "payment".into()),
            ("line_items[0][price]".into(), input.price_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("customer_email".into(), input.customer_email.clone()),
            ("return_url".into(), input.return_url.clone()),
        ];
        for (key, value) in &input.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let url = format!("{}/checkout/sessions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let session: CheckoutSession = resp.json().await?;
        tracing::info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    /// Fetch a checkout session by id.
    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let url = format!("{}/checkout/sessions/{}", self.base_url, session_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_dispatches_on_type() {
        let raw = serde_json::json!({
            "id": "evt_42",
            "type": "payment_intent.created",
            "data": { "object": { "id": "pi_1" } }
        });
        let event: Event = serde_json::from_value(raw).unwrap();
        assert!(!event.is_checkout_completed());
    }

    #[test]
    fn checkout_session_metadata_deserializes() {
        let raw = serde_json::json!({
            "id": "cs_test_9",
            "amount_total": 49900,
            "currency": "usd",
            "payment_intent": "pi_9",
            "metadata": { "brandId": "b-1", "userId": "u-1", "brandName": "Crust & Co" }
        });
        let session: CheckoutSession = serde_json::from_value(raw).unwrap();
        assert_eq!(session.metadata.get("brandId").map(String::as_str), Some("b-1"));
        assert_eq!(session.amount_total, Some(49900));
    }

    #[test]
    fn session_without_metadata_defaults_empty() {
        let raw = serde_json::json!({ "id": "cs_test_0" });
        let session: CheckoutSession = serde_json::from_value(raw).unwrap();
        assert!(session.metadata.is_empty());
    }
}
