mod moderation_log;
mod report;
mod response;
mod review;

pub use moderation_log::ModerationLog;
pub use report::ReviewReport;
pub use response::ReviewResponse;
pub use review::Review;
