pub mod claims;
pub mod classifier;
pub mod deps;
pub mod gateway;
pub mod insights;
pub mod moderation;
pub mod notify;
pub mod scoring;

pub use deps::{Classifier, Notifier, PaymentGateway, ServerDeps};

pub type Result<T> = std::result::Result<T, franscore_common::FranScoreError>;
