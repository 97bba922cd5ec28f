//! Review submission and the moderation state machine.
//!
//! Status only moves forward: `pending -> approved | rejected`, both
//! terminal. The classifier's verdict is advisory metadata attached at
//! submission; only a human decision transitions status. On approval the
//! brand's aggregates and word cloud are updated inside the same
//! transaction as the status change; notifications go out after commit
//! and can never fail the transition.

use chrono::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use franscore_common::{
    FranScoreError, ModerationAction, ModerationAssessment, NotificationIntent, ReviewStatus,
};
use franscore_domains::brands::Brand;
use franscore_domains::reviews::{ModerationLog, Review};
use franscore_domains::users::User;

use crate::notify::dispatch_detached;
use crate::{insights, scoring, Result, ServerDeps};

/// Longest review preview included in owner notifications.
const PREVIEW_CHARS: usize = 140;

#[derive(Debug, Clone)]
pub struct SubmitReview {
    pub brand_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub overall_rating: i32,
    pub support_rating: Option<i32>,
    pub training_rating: Option<i32>,
    pub profitability_rating: Option<i32>,
    pub culture_rating: Option<i32>,
    pub years_as_franchisee: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ModerateRequest {
    pub review_id: Uuid,
    pub action: ModerationAction,
    pub moderator_id: Uuid,
    pub notes: Option<String>,
}

/// Boundary validation for a submission. Checked before any storage or
/// classifier call.
pub fn validate_submission(req: &SubmitReview) -> Result<()> {
    if req.title.trim().is_empty() {
        return Err(FranScoreError::Validation("title must not be empty".into()));
    }
    if req.title.len() > 255 {
        return Err(FranScoreError::Validation(
            "title too long (max 255 characters)".into(),
        ));
    }
    if req.content.trim().is_empty() {
        return Err(FranScoreError::Validation(
            "content must not be empty".into(),
        ));
    }
    validate_rating("overall_rating", Some(req.overall_rating))?;
    validate_rating("support_rating", req.support_rating)?;
    validate_rating("training_rating", req.training_rating)?;
    validate_rating("profitability_rating", req.profitability_rating)?;
    validate_rating("culture_rating", req.culture_rating)?;
    if let Some(years) = req.years_as_franchisee {
        if years < 0 {
            return Err(FranScoreError::Validation(
                "years_as_franchisee must not be negative".into(),
            ));
        }
    }
    Ok(())
}

fn validate_rating(name: &str, value: Option<i32>) -> Result<()> {
    match value {
        Some(v) if !(1..=5).contains(&v) => Err(FranScoreError::Validation(format!(
            "{name} must be between 1 and 5"
        ))),
        _ => Ok(()),
    }
}

/// Guard for the state machine: only `pending` reviews accept a decision.
/// Re-moderating an already-decided review is an illegal-state error, not
/// a silent overwrite.
pub fn ensure_pending(status: &str) -> Result<()> {
    match ReviewStatus::parse(status) {
        Some(ReviewStatus::Pending) => Ok(()),
        Some(terminal) => Err(FranScoreError::IllegalState(format!(
            "review is already {terminal}; moderation decisions are final"
        ))),
        None => Err(FranScoreError::IllegalState(format!(
            "review has unrecognized status {status:?}"
        ))),
    }
}

/// Create a review in `pending` state with advisory classifier metadata.
pub async fn submit_review(deps: &ServerDeps, req: SubmitReview) -> Result<Review> {
    validate_submission(&req)?;

    let brand = Brand::find_by_id(req.brand_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::Validation(format!("unknown brand {}", req.brand_id)))?;
    let author = User::find_by_id(req.author_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::Validation(format!("unknown author {}", req.author_id)))?;

    // Shared-store throttle: the count lives in Postgres so the limit
    // holds across server instances.
    let recent =
        Review::count_recent_by_author(req.author_id, Duration::hours(24), deps.pool()).await?;
    if recent >= deps.config.review_rate_limit_per_day {
        return Err(FranScoreError::RateLimited(format!(
            "max {} reviews per 24h",
            deps.config.review_rate_limit_per_day
        )));
    }

    let assessment = match deps.classifier.classify(&req.title, &req.content).await {
        Ok(a) => a.clamped(),
        Err(e) => {
            warn!(error = %e, brand_id = %req.brand_id, "Classifier unavailable, routing to manual review");
            ModerationAssessment::fallback()
        }
    };

    let review = Review::create(
        req.brand_id,
        req.author_id,
        req.title.trim(),
        &req.content,
        req.overall_rating,
        req.support_rating,
        req.training_rating,
        req.profitability_rating,
        req.culture_rating,
        req.years_as_franchisee,
        &assessment,
        author.is_verified,
        deps.pool(),
    )
    .await?;

    info!(
        review_id = %review.id,
        brand = %brand.slug,
        category = %assessment.category,
        sentiment = %assessment.sentiment,
        "Review submitted"
    );

    Ok(review)
}

/// Apply a human moderation decision.
///
/// Status change, audit log, aggregate recompute, and word-cloud fold all
/// commit in one transaction; the review and brand rows are locked so
/// concurrent decisions and concurrent approvals for the same brand
/// serialize. Notifications are dispatched after commit, detached.
pub async fn moderate(deps: &ServerDeps, req: ModerateRequest) -> Result<Review> {
    let review = Review::find_by_id(req.review_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("review {}", req.review_id)))?;
    ensure_pending(&review.status)?;

    // Term extraction calls the classifier over the network; do it before
    // the transaction opens so no external call runs under row locks. An
    // extraction failure degrades to an empty term list.
    let terms = if req.action == ModerationAction::Approve {
        match deps.classifier.extract_terms(&review.content).await {
            Ok(t) => insights::dedupe_terms(t),
            Err(e) => {
                warn!(error = %e, review_id = %review.id, "Term extraction failed, skipping word cloud update");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let mut tx = deps
        .pool()
        .begin()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;

    let locked = Review::lock_for_update(req.review_id, &mut tx)
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("review {}", req.review_id)))?;
    // Authoritative check under the row lock: a racing moderator may have
    // decided this review since the pre-read.
    ensure_pending(&locked.status)?;

    let new_status = req.action.resulting_status();
    Review::set_status(req.review_id, new_status.as_str(), &mut tx).await?;
    ModerationLog::append(
        req.review_id,
        req.moderator_id,
        req.action.as_str(),
        &locked.status,
        new_status.as_str(),
        req.notes.as_deref(),
        &mut tx,
    )
    .await?;

    let mut approved_brand: Option<Brand> = None;
    if req.action == ModerationAction::Approve {
        let brand = Brand::lock_for_update(locked.brand_id, &mut tx)
            .await?
            .ok_or_else(|| FranScoreError::NotFound(format!("brand {}", locked.brand_id)))?;
        let agg = scoring::recompute_in(locked.brand_id, &mut tx).await?;
        insights::fold_review_terms(locked.brand_id, &terms, &mut tx).await?;
        info!(
            brand = %brand.slug,
            total_reviews = agg.total_reviews,
            z_score = agg.z_score,
            "Brand scores recomputed"
        );
        approved_brand = Some(brand);
    }

    tx.commit()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;

    info!(
        review_id = %req.review_id,
        moderator_id = %req.moderator_id,
        action = %req.action,
        "Moderation decision applied"
    );

    if let Err(e) =
        send_decision_notifications(deps, &locked, req.action, req.notes.as_deref(), approved_brand)
            .await
    {
        warn!(error = %e, review_id = %req.review_id, "Could not assemble decision notifications");
    }

    Review::find_by_id(req.review_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("review {}", req.review_id)))
}

/// Store a franchisor response to a review. Only the brand's current
/// claim holder may respond; the response enters its own pending flow.
pub async fn respond_to_review(
    deps: &ServerDeps,
    review_id: Uuid,
    responder_id: Uuid,
    content: &str,
) -> Result<franscore_domains::reviews::ReviewResponse> {
    if content.trim().is_empty() {
        return Err(FranScoreError::Validation(
            "response content must not be empty".into(),
        ));
    }

    let review = Review::find_by_id(review_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("review {review_id}")))?;
    let brand = Brand::find_by_id(review.brand_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("brand {}", review.brand_id)))?;

    if brand.claimed_by_id != Some(responder_id) {
        return Err(FranScoreError::Unauthorized(
            "only the brand's claim holder may respond to its reviews".into(),
        ));
    }

    let response = franscore_domains::reviews::ReviewResponse::create(
        review_id,
        responder_id,
        content.trim(),
        deps.pool(),
    )
    .await?;

    info!(review_id = %review_id, responder_id = %responder_id, "Review response submitted");
    Ok(response)
}

/// File a user report against a review. Sets the review's parallel
/// `is_flagged` marker; status is untouched, reports never un-approve.
pub async fn report_review(
    deps: &ServerDeps,
    review_id: Uuid,
    reporter_id: Uuid,
    reason: &str,
    description: Option<&str>,
) -> Result<franscore_domains::reviews::ReviewReport> {
    if reason.trim().is_empty() {
        return Err(FranScoreError::Validation("reason must not be empty".into()));
    }

    let review = Review::find_by_id(review_id, deps.pool())
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("review {review_id}")))?;

    let report = franscore_domains::reviews::ReviewReport::create(
        review.id,
        reporter_id,
        reason.trim(),
        description,
        deps.pool(),
    )
    .await?;
    Review::mark_flagged(review.id, deps.pool()).await?;

    info!(review_id = %review_id, reporter_id = %reporter_id, reason, "Review reported");
    Ok(report)
}

/// Look up recipients and hand intents to the notifier, detached. Returns
/// an error only when recipient lookup fails; delivery failures are the
/// notifier's to log.
async fn send_decision_notifications(
    deps: &ServerDeps,
    review: &Review,
    action: ModerationAction,
    notes: Option<&str>,
    approved_brand: Option<Brand>,
) -> Result<()> {
    let author = User::find_by_id(review.author_id, deps.pool()).await?;
    let brand = match approved_brand {
        Some(b) => Some(b),
        None => Brand::find_by_id(review.brand_id, deps.pool()).await?,
    };
    let (Some(author), Some(brand)) = (author, brand) else {
        return Ok(()); // recipient rows vanished; nothing to deliver
    };

    match action {
        ModerationAction::Approve => {
            dispatch_detached(
                deps.notifier.clone(),
                NotificationIntent::ReviewApproved {
                    author_email: author.email,
                    brand_name: brand.name.clone(),
                    review_id: review.id,
                },
            );

            if brand.is_claimed {
                if let Some(owner_id) = brand.claimed_by_id {
                    if let Some(owner) = User::find_by_id(owner_id, deps.pool()).await? {
                        dispatch_detached(
                            deps.notifier.clone(),
                            NotificationIntent::NewReviewForClaimedBrand {
                                owner_email: owner.email,
                                brand_name: brand.name,
                                preview: review.content.chars().take(PREVIEW_CHARS).collect(),
                                rating: review.overall_rating,
                            },
                        );
                    }
                }
            }
        }
        ModerationAction::Reject => {
            dispatch_detached(
                deps.notifier.clone(),
                NotificationIntent::ReviewRejected {
                    author_email: author.email,
                    brand_name: brand.name,
                    reason: notes.unwrap_or("did not meet review guidelines").to_string(),
                },
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> SubmitReview {
        SubmitReview {
            brand_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            title: "Solid franchise, slow onboarding".into(),
            content: "Corporate support was strong but training took months.".into(),
            overall_rating: 4,
            support_rating: Some(5),
            training_rating: Some(2),
            profitability_rating: None,
            culture_rating: None,
            years_as_franchisee: Some(3),
        }
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&submission()).is_ok());
    }

    #[test]
    fn out_of_range_ratings_are_rejected() {
        let mut req = submission();
        req.overall_rating = 6;
        assert!(matches!(
            validate_submission(&req),
            Err(FranScoreError::Validation(_))
        ));

        let mut req = submission();
        req.support_rating = Some(0);
        assert!(matches!(
            validate_submission(&req),
            Err(FranScoreError::Validation(_))
        ));
    }

    #[test]
    fn absent_category_ratings_are_fine() {
        let mut req = submission();
        req.support_rating = None;
        req.training_rating = None;
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn blank_title_or_content_is_rejected() {
        let mut req = submission();
        req.title = "   ".into();
        assert!(validate_submission(&req).is_err());

        let mut req = submission();
        req.content = String::new();
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn pending_review_accepts_a_decision() {
        assert!(ensure_pending("pending").is_ok());
    }

    #[test]
    fn decided_reviews_refuse_further_decisions() {
        for status in ["approved", "rejected"] {
            assert!(matches!(
                ensure_pending(status),
                Err(FranScoreError::IllegalState(_))
            ));
        }
    }

    #[test]
    fn garbage_status_is_an_illegal_state() {
        assert!(matches!(
            ensure_pending("flagged"),
            Err(FranScoreError::IllegalState(_))
        ));
    }
}
