use thiserror::Error;

pub type Result<T> = std::result::Result<T, StripeError>;

#[derive(Debug, Error)]
pub enum StripeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Signature verification failed: {0}")]
    Signature(String),
}

impl From<reqwest::Error> for StripeError {
    fn from(err: reqwest::Error) -> Self {
        StripeError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StripeError {
    fn from(err: serde_json::Error) -> Self {
        StripeError::Parse(err.to_string())
    }
}
