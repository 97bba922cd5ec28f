use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostmarkError>;

#[derive(Debug, Error)]
pub enum PostmarkError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for PostmarkError {
    fn from(err: reqwest::Error) -> Self {
        PostmarkError::Network(err.to_string())
    }
}
