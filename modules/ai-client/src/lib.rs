mod client;
pub mod schema;
mod types;

pub use schema::StructuredOutput;

use anyhow::{anyhow, Result};

use client::OpenAiClient;

/// OpenAI chat-completions agent. One instance per configured model;
/// cheap to clone.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }

    /// Type-safe structured extraction: the response is constrained to the
    /// JSON schema of `T` (strict mode) and deserialized with serde.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T> {
        let request = types::ChatRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(system_prompt),
                types::WireMessage::user(user_prompt),
            ],
            temperature: Some(0.0),
            response_format: Some(types::ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: types::JsonSchemaFormat {
                    name: T::type_name(),
                    strict: true,
                    schema: T::openai_schema(),
                },
            }),
        };

        let json_str = self.client().completion(&request).await?;

        serde_json::from_str(&json_str)
            .map_err(|e| anyhow!("Failed to deserialize structured response: {}", e))
    }

    /// Plain chat completion, no schema constraint.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = types::ChatRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(system),
                types::WireMessage::user(user),
            ],
            temperature: Some(0.0),
            response_format: None,
        };

        self.client().completion(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_model_and_key() {
        let ai = OpenAi::new("sk-test", "gpt-4o");
        assert_eq!(ai.model(), "gpt-4o");
        assert_eq!(ai.api_key, "sk-test");
        assert!(ai.base_url.is_none());
    }

    #[test]
    fn with_base_url_overrides_default() {
        let ai = OpenAi::new("sk-test", "gpt-4o").with_base_url("http://localhost:9999/v1");
        assert_eq!(ai.base_url.as_deref(), Some("http://localhost:9999/v1"));
    }
}
