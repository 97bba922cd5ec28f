//! Brand reputation aggregation.
//!
//! Aggregates are recomputed wholesale from the current approved review
//! set every time that set changes, never patched incrementally, so a
//! re-run with unchanged input is a no-op and rounding can never compound.

use sqlx::PgConnection;
use uuid::Uuid;

use franscore_common::FranScoreError;
use franscore_domains::brands::{Brand, BrandAggregates};
use franscore_domains::reviews::Review;

use crate::Result;

/// Weight of the overall rating in the Z-Score.
pub const WEIGHT_OVERALL: f64 = 0.4;
/// Weight of each of the four category averages in the Z-Score.
pub const WEIGHT_CATEGORY: f64 = 0.15;

/// Just the rating fields of a review, decoupled from the full row so the
/// math is testable without a database.
#[derive(Debug, Clone, Copy)]
pub struct RatingSet {
    pub overall: i32,
    pub support: Option<i32>,
    pub training: Option<i32>,
    pub profitability: Option<i32>,
    pub culture: Option<i32>,
}

impl From<&Review> for RatingSet {
    fn from(r: &Review) -> Self {
        Self {
            overall: r.overall_rating,
            support: r.support_rating,
            training: r.training_rating,
            profitability: r.profitability_rating,
            culture: r.culture_rating,
        }
    }
}

/// Pure aggregation over the approved set.
///
/// Category averages are taken over the reviews that carry that rating; a
/// category nobody rated contributes 0 to the weighted formula rather than
/// poisoning it with NaN. Sums accumulate in i64 (ratings are 1–5 ints) so
/// intermediate math is exact; only the persisted values are rounded, to
/// 2 decimal places.
pub fn aggregate(ratings: &[RatingSet]) -> BrandAggregates {
    if ratings.is_empty() {
        // No reviews, no score.
        return BrandAggregates::default();
    }

    let n = ratings.len() as i64;
    let overall_sum: i64 = ratings.iter().map(|r| r.overall as i64).sum();

    let category = |select: fn(&RatingSet) -> Option<i32>| -> f64 {
        let mut sum: i64 = 0;
        let mut count: i64 = 0;
        for r in ratings {
            if let Some(v) = select(r) {
                sum += v as i64;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        }
    };

    let avg_overall = overall_sum as f64 / n as f64;
    let avg_support = category(|r| r.support);
    let avg_training = category(|r| r.training);
    let avg_profitability = category(|r| r.profitability);
    let avg_culture = category(|r| r.culture);

    let z_score = WEIGHT_OVERALL * avg_overall
        + WEIGHT_CATEGORY * (avg_support + avg_training + avg_profitability + avg_culture);

    BrandAggregates {
        total_reviews: n as i32,
        average_rating: round2(avg_overall),
        z_score: round2(z_score),
        support_score: round2(avg_support),
        training_score: round2(avg_training),
        profitability_score: round2(avg_profitability),
        culture_score: round2(avg_culture),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recompute and persist inside an open transaction. The caller must hold
/// the brand row lock (`Brand::lock_for_update`) so concurrent approvals
/// for the same brand serialize instead of interleaving reads and writes.
pub async fn recompute_in(brand_id: Uuid, conn: &mut PgConnection) -> Result<BrandAggregates> {
    let reviews = Review::approved_for_brand(brand_id, conn).await?;
    let ratings: Vec<RatingSet> = reviews.iter().map(RatingSet::from).collect();
    let agg = aggregate(&ratings);
    Brand::update_aggregates(brand_id, &agg, conn).await?;
    Ok(agg)
}

/// Standalone recompute in its own transaction. Safe to re-run at any
/// time: with no intervening review changes the result is identical.
pub async fn recompute_brand_scores(
    brand_id: Uuid,
    pool: &sqlx::PgPool,
) -> Result<BrandAggregates> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;

    Brand::lock_for_update(brand_id, &mut tx)
        .await?
        .ok_or_else(|| FranScoreError::NotFound(format!("brand {brand_id}")))?;

    let agg = recompute_in(brand_id, &mut tx).await?;

    tx.commit()
        .await
        .map_err(|e| FranScoreError::Database(e.to_string()))?;
    Ok(agg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(overall: i32) -> RatingSet {
        RatingSet {
            overall,
            support: None,
            training: None,
            profitability: None,
            culture: None,
        }
    }

    #[test]
    fn empty_set_yields_zero_state() {
        let agg = aggregate(&[]);
        assert_eq!(agg.total_reviews, 0);
        assert_eq!(agg.average_rating, 0.0);
        assert_eq!(agg.z_score, 0.0);
    }

    #[test]
    fn weighted_score_worked_example() {
        // Overalls [5,4], supports [5,3], other categories absent:
        // avg = 4.5, support = 4.0, z = 0.4*4.5 + 0.15*4.0 = 2.4
        let ratings = [
            RatingSet {
                overall: 5,
                support: Some(5),
                ..rs(0)
            },
            RatingSet {
                overall: 4,
                support: Some(3),
                ..rs(0)
            },
        ];
        let agg = aggregate(&ratings);
        assert_eq!(agg.total_reviews, 2);
        assert_eq!(agg.average_rating, 4.5);
        assert_eq!(agg.support_score, 4.0);
        assert_eq!(agg.training_score, 0.0);
        assert_eq!(agg.profitability_score, 0.0);
        assert_eq!(agg.culture_score, 0.0);
        assert_eq!(agg.z_score, 2.4);
    }

    #[test]
    fn absent_category_counts_as_zero_not_nan() {
        let agg = aggregate(&[rs(5)]);
        assert_eq!(agg.support_score, 0.0);
        assert!(!agg.z_score.is_nan());
        assert_eq!(agg.z_score, 2.0); // 0.4 * 5.0
    }

    #[test]
    fn category_average_only_counts_reviews_that_rated_it() {
        // One review rates support 5, the other leaves it blank: the
        // average is 5.0, not 2.5.
        let ratings = [
            RatingSet {
                overall: 4,
                support: Some(5),
                ..rs(0)
            },
            rs(4),
        ];
        let agg = aggregate(&ratings);
        assert_eq!(agg.support_score, 5.0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let ratings: Vec<RatingSet> = (0..1000)
            .map(|i| RatingSet {
                overall: 1 + (i % 5) as i32,
                support: Some(1 + (i % 3) as i32),
                training: if i % 2 == 0 { Some(4) } else { None },
                profitability: None,
                culture: Some(5),
            })
            .collect();
        assert_eq!(aggregate(&ratings), aggregate(&ratings));
    }

    #[test]
    fn persisted_values_are_rounded_to_two_decimals() {
        // Three reviews averaging 4.333... must persist as 4.33.
        let ratings = [rs(5), rs(4), rs(4)];
        let agg = aggregate(&ratings);
        assert_eq!(agg.average_rating, 4.33);
        // z = 0.4 * (13/3) = 1.7333... -> 1.73, from the unrounded average
        assert_eq!(agg.z_score, 1.73);
    }

    #[test]
    fn total_reviews_tracks_input_cardinality() {
        for n in [1usize, 2, 7, 42] {
            let ratings: Vec<RatingSet> = (0..n).map(|_| rs(3)).collect();
            assert_eq!(aggregate(&ratings).total_reviews, n as i32);
        }
    }
}
