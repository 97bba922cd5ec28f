use thiserror::Error;

#[derive(Error, Debug)]
pub enum FranScoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Webhook signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl FranScoreError {
    /// Whether the caller can expect a retry of the same request to succeed.
    /// Validation, authorization, and state errors are permanent; storage
    /// errors are transient and safe to retry because every mutating
    /// operation is idempotent or guarded (see the claims processor).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FranScoreError::Database(_) | FranScoreError::Anyhow(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_storage_errors_are_retryable() {
        assert!(FranScoreError::Database("connection reset".into()).is_retryable());
        assert!(!FranScoreError::Validation("bad rating".into()).is_retryable());
        assert!(!FranScoreError::IllegalState("already decided".into()).is_retryable());
        assert!(!FranScoreError::SignatureVerification("bad v1".into()).is_retryable());
    }
}
