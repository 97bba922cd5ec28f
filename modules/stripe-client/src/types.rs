use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, StripeError};

/// Event type that carries a completed checkout and drives claim state.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// A verified webhook event envelope. `data.object` stays untyped until the
/// caller asks for a concrete shape, since only checkout completions are
/// acted on and every other event type is acknowledged as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl Event {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_SESSION_COMPLETED
    }

    /// Extract the checkout session payload. Only meaningful for
    /// `checkout.session.completed` events.
    pub fn checkout_session(&self) -> Result<CheckoutSession> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| StripeError::Parse(format!("checkout session payload: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Input for creating an embedded checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionInput {
    pub price_id: String,
    pub customer_email: String,
    pub return_url: String,
    pub metadata: Vec<(String, String)>,
}
