pub mod error;

pub use error::{PostmarkError, Result};

use serde::Serialize;

const BASE_URL: &str = "https://api.postmarkapp.com";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

pub struct PostmarkClient {
    client: reqwest::Client,
    server_token: String,
    base_url: String,
}

impl PostmarkClient {
    pub fn new(server_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_token,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub async fn send_email(&self, email: &OutboundEmail) -> Result<()> {
        let url = format!("{}/email", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("X-Postmark-Server-Token", &self.server_token)
            .json(email)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PostmarkError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        tracing::debug!(to = %email.to, subject = %email.subject, "Email accepted by Postmark");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_email_uses_postmark_field_names() {
        let email = OutboundEmail {
            from: "noreply@franscore.com".into(),
            to: "owner@example.com".into(),
            subject: "hi".into(),
            text_body: "body".into(),
        };
        let value = serde_json::to_value(&email).unwrap();
        assert!(value.get("From").is_some());
        assert!(value.get("TextBody").is_some());
        assert!(value.get("from").is_none());
    }
}
