use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// --- Review lifecycle ---

/// Moderation status of a review. Transitions only move forward:
/// `Pending -> Approved` or `Pending -> Rejected`; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approve => "approve",
            ModerationAction::Reject => "reject",
        }
    }

    /// The status a pending review lands in after this action.
    pub fn resulting_status(&self) -> ReviewStatus {
        match self {
            ModerationAction::Approve => ReviewStatus::Approved,
            ModerationAction::Reject => ReviewStatus::Rejected,
        }
    }
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- AI classification ---

/// Advisory category assigned by the classifier at submission time.
/// Never changes `ReviewStatus` by itself; only a human decision does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModerationCategory {
    Clean,
    NeedsReview,
    Rejected,
}

impl ModerationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationCategory::Clean => "clean",
            ModerationCategory::NeedsReview => "needs_review",
            ModerationCategory::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ModerationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full classifier verdict for one review. Advisory metadata only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModerationAssessment {
    pub category: ModerationCategory,
    pub sentiment: Sentiment,
    /// -1.0 (very negative) .. 1.0 (very positive)
    pub sentiment_score: f64,
    pub flags: Vec<String>,
    pub summary: String,
}

impl ModerationAssessment {
    /// Conservative substitute used when the classifier is unreachable or
    /// returns garbage: route the review to human eyes and record why.
    pub fn fallback() -> Self {
        Self {
            category: ModerationCategory::NeedsReview,
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            flags: vec!["classification_error".to_string()],
            summary: "Unable to analyze content automatically".to_string(),
        }
    }

    pub fn clamped(mut self) -> Self {
        self.sentiment_score = self.sentiment_score.clamp(-1.0, 1.0);
        self
    }
}

/// One extracted term with the sentiment of its surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TermSentiment {
    pub word: String,
    pub sentiment: Sentiment,
}

// --- Users ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Browser,
    Franchisee,
    Franchisor,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Browser => "browser",
            UserRole::Franchisee => "franchisee",
            UserRole::Franchisor => "franchisor",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
        ] {
            assert_eq!(ReviewStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReviewStatus::parse("flagged"), None);
    }

    #[test]
    fn action_maps_to_terminal_status() {
        assert_eq!(
            ModerationAction::Approve.resulting_status(),
            ReviewStatus::Approved
        );
        assert_eq!(
            ModerationAction::Reject.resulting_status(),
            ReviewStatus::Rejected
        );
    }

    #[test]
    fn fallback_assessment_routes_to_human() {
        let fb = ModerationAssessment::fallback();
        assert_eq!(fb.category, ModerationCategory::NeedsReview);
        assert_eq!(fb.sentiment_score, 0.0);
        assert!(fb.flags.iter().any(|f| f == "classification_error"));
    }

    #[test]
    fn sentiment_score_is_clamped() {
        let a = ModerationAssessment {
            category: ModerationCategory::Clean,
            sentiment: Sentiment::Positive,
            sentiment_score: 3.7,
            flags: vec![],
            summary: String::new(),
        }
        .clamped();
        assert_eq!(a.sentiment_score, 1.0);
    }
}
