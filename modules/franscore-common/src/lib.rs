pub mod config;
pub mod error;
pub mod notifications;
pub mod types;

pub use config::Config;
pub use error::FranScoreError;
pub use notifications::NotificationIntent;
pub use types::*;
