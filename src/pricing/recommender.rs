//! Dynamic markdown pricing for perishable listings: tiered discount bands
//! keyed by days-until-expiry, adjusted by category perishability, bounded
//! by a hard discount cap and a price floor.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{
    CATEGORY_ADJUSTMENT_WEIGHT, DEFAULT_EXPIRY_DAYS, MAX_DISCOUNT_CAP, MAX_PRICE_DISCOUNT_RELIEF,
    MIN_PRICE_DISCOUNT_STRETCH, PRICE_FLOOR_RATIO,
};
use crate::error::{AppError, Result};
use crate::expiry;
use crate::types::Category;
use crate::util::round2;

#[derive(Debug, Clone, Copy)]
pub struct DiscountTier {
    /// Inclusive upper bound in days; `None` on the final catch-all tier.
    pub max_days: Option<i64>,
    pub min_discount: f64,
    pub max_discount: f64,
    pub label: &'static str,
}

/// Ascending in `max_days`, non-increasing in `min_discount`. Lookup takes
/// the first tier whose bound covers the remaining days, so boundaries at
/// 1/3/7/14 days are inclusive; off-by-one changes here shift discount
/// bands at tier edges.
pub const DISCOUNT_TIERS: &[DiscountTier] = &[
    DiscountTier { max_days: Some(1), min_discount: 0.50, max_discount: 0.70, label: "Expires today/tomorrow" },
    DiscountTier { max_days: Some(3), min_discount: 0.35, max_discount: 0.50, label: "Expiring soon" },
    DiscountTier { max_days: Some(7), min_discount: 0.25, max_discount: 0.40, label: "Expiring this week" },
    DiscountTier { max_days: Some(14), min_discount: 0.10, max_discount: 0.25, label: "1-2 weeks left" },
    DiscountTier { max_days: None, min_discount: 0.00, max_discount: 0.10, label: "Long shelf life" },
];

pub fn discount_tier(days: i64) -> &'static DiscountTier {
    DISCOUNT_TIERS
        .iter()
        .find(|tier| tier.max_days.map_or(true, |max| days <= max))
        .expect("final tier is unbounded")
}

/// Days remaining before expiry for pricing purposes: unparseable or absent
/// dates assume a 30-day shelf life (NOT the urgency scorer's 0.5 neutral),
/// and already-past dates clamp to 0.
pub fn days_until_expiry(expiry_date: Option<&str>, now: DateTime<Utc>) -> i64 {
    expiry::days_until(expiry_date, now)
        .unwrap_or(DEFAULT_EXPIRY_DAYS)
        .max(0)
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRecommendation {
    pub recommended_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub original_price: f64,
    pub discount_percentage: f64,
    pub days_until_expiry: i64,
    pub category: String,
    pub urgency_label: String,
    pub reasoning: String,
}

fn reasoning(days: i64, category: &str) -> String {
    if days <= 1 {
        format!("Price reduced significantly because this {category} item expires within a day. Quick sale recommended.")
    } else if days <= 3 {
        format!("Strong discount applied since this {category} item is expiring soon.")
    } else if days <= 7 {
        format!("Moderate discount applied; this {category} item has about a week of freshness remaining.")
    } else if days <= 14 {
        format!("Light discount, as this {category} item still has one to two weeks of shelf life.")
    } else {
        format!("Minimal discount. This {category} item still has a long shelf life.")
    }
}

/// Rule-based price recommendation.
///
/// Invariant for every valid input:
/// `floor <= min_price <= recommended_price <= max_price <= original_price`
/// with `floor = original_price * PRICE_FLOOR_RATIO`, and the discount never
/// exceeds `MAX_DISCOUNT_CAP` regardless of category or urgency.
pub fn recommend(
    original_price: f64,
    expiry_date: Option<&str>,
    category: Option<&str>,
    now: DateTime<Utc>,
) -> Result<PriceRecommendation> {
    if !(original_price > 0.0) {
        return Err(AppError::InvalidInput(
            "original_price must be a positive number".to_string(),
        ));
    }

    let days = days_until_expiry(expiry_date, now);
    let tier = discount_tier(days);

    let category_label = category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("other");
    let perishability = Category::parse(category_label).perishability();

    let midpoint = (tier.min_discount + tier.max_discount) / 2.0;
    let adjusted =
        (midpoint + (1.0 - perishability) * CATEGORY_ADJUSTMENT_WEIGHT).min(MAX_DISCOUNT_CAP);

    Ok(assemble(original_price, adjusted, days, category_label))
}

/// Builds the full recommendation from a settled discount rate. Shared with
/// the learned price path so both produce the same bracket and fields.
pub(crate) fn assemble(
    original_price: f64,
    discount: f64,
    days: i64,
    category_label: &str,
) -> PriceRecommendation {
    let floor = original_price * PRICE_FLOOR_RATIO;
    let recommended = (original_price * (1.0 - discount)).max(floor);
    let aggressive = (discount * MIN_PRICE_DISCOUNT_STRETCH).min(MAX_DISCOUNT_CAP);
    let min_price = (original_price * (1.0 - aggressive)).max(floor);
    let max_price = original_price * (1.0 - discount * MAX_PRICE_DISCOUNT_RELIEF);

    PriceRecommendation {
        recommended_price: round2(recommended),
        min_price: round2(min_price),
        max_price: round2(max_price),
        original_price,
        discount_percentage: (discount * 1000.0).round() / 10.0,
        days_until_expiry: days,
        category: category_label.to_string(),
        urgency_label: discount_tier(days).label.to_string(),
        reasoning: reasoning(days, category_label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn days_from_now(n: i64) -> String {
        (Utc::now() + Duration::days(n)).to_rfc3339()
    }

    fn recommend_in(price: f64, days: i64, category: &str) -> PriceRecommendation {
        recommend(price, Some(&days_from_now(days)), Some(category), Utc::now()).unwrap()
    }

    // --- tier table -------------------------------------------------------

    #[test]
    fn tiers_ascend_with_non_increasing_floors() {
        for pair in DISCOUNT_TIERS.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].max_days, pair[1].max_days) {
                assert!(a < b);
            }
            assert!(pair[0].min_discount >= pair[1].min_discount);
            assert!(pair[0].max_discount >= pair[1].max_discount);
        }
        assert!(DISCOUNT_TIERS.last().unwrap().max_days.is_none());
    }

    #[test]
    fn tier_boundaries_are_inclusive() {
        assert_eq!(discount_tier(0).max_days, Some(1));
        assert_eq!(discount_tier(1).max_days, Some(1));
        assert_eq!(discount_tier(2).max_days, Some(3));
        assert_eq!(discount_tier(3).max_days, Some(3));
        assert_eq!(discount_tier(5).label, "Expiring this week");
        assert_eq!(discount_tier(7).max_days, Some(7));
        assert_eq!(discount_tier(10).max_days, Some(14));
        assert_eq!(discount_tier(14).max_days, Some(14));
        assert_eq!(discount_tier(60).label, "Long shelf life");
        assert_eq!(discount_tier(60).min_discount, 0.0);
    }

    // --- days until expiry ------------------------------------------------

    #[test]
    fn missing_expiry_defaults_to_thirty_days() {
        assert_eq!(days_until_expiry(None, Utc::now()), 30);
        assert_eq!(days_until_expiry(Some(""), Utc::now()), 30);
        assert_eq!(days_until_expiry(Some("not-a-date"), Utc::now()), 30);
    }

    #[test]
    fn past_expiry_clamps_to_zero() {
        let days = days_until_expiry(Some(&days_from_now(-5)), Utc::now());
        assert_eq!(days, 0);
    }

    #[test]
    fn future_date_counts_whole_days() {
        let days = days_until_expiry(Some(&days_from_now(10)), Utc::now());
        assert!((9..=10).contains(&days));
    }

    // --- recommend --------------------------------------------------------

    #[test]
    fn seafood_expiring_today_discounts_hard() {
        let rec = recommend_in(10.0, 0, "seafood");
        assert!(rec.discount_percentage >= 50.0);
        assert!(rec.recommended_price <= 6.0);
    }

    #[test]
    fn frozen_with_long_shelf_life_barely_discounts() {
        let rec = recommend_in(20.0, 60, "frozen");
        assert!(rec.discount_percentage <= 15.0);
        assert!(rec.recommended_price >= 17.0);
    }

    #[test]
    fn bracket_invariant_holds_across_inputs() {
        for (price, days, category) in [
            (10.0, 0, "seafood"),
            (10.0, 1, "dairy"),
            (20.0, 5, "produce"),
            (100.0, 0, "meat"),
            (15.0, 60, "canned"),
            (0.01, 2, "bakery"),
            (1_000_000.0, 3, "dairy"),
        ] {
            let rec = recommend_in(price, days, category);
            let floor = round2(price * PRICE_FLOOR_RATIO);
            assert!(rec.min_price >= floor, "{category}: min below floor");
            assert!(rec.min_price <= rec.recommended_price, "{category}");
            assert!(rec.recommended_price <= rec.max_price, "{category}");
            assert!(rec.max_price <= rec.original_price, "{category}");
            assert!(rec.discount_percentage <= MAX_DISCOUNT_CAP * 100.0);
        }
    }

    #[test]
    fn no_expiry_uses_thirty_day_default() {
        let rec = recommend(15.0, None, Some("other"), Utc::now()).unwrap();
        assert_eq!(rec.days_until_expiry, 30);
        assert!(rec.discount_percentage <= 20.0);
    }

    #[test]
    fn perishable_meat_beats_shelf_stable_canned() {
        let meat = recommend_in(10.0, 5, "meat");
        let canned = recommend_in(10.0, 5, "canned");
        assert!(meat.discount_percentage > canned.discount_percentage);
    }

    #[test]
    fn unknown_and_missing_categories_fall_back() {
        let rec = recommend_in(10.0, 5, "xyz_unknown");
        assert_eq!(rec.category, "xyz_unknown");
        assert!(rec.recommended_price > 0.0);

        let rec = recommend(10.0, Some(&days_from_now(5)), None, Utc::now()).unwrap();
        assert_eq!(rec.category, "other");
    }

    #[test]
    fn nonpositive_price_is_invalid_input() {
        assert!(recommend(0.0, None, Some("dairy"), Utc::now()).is_err());
        assert!(recommend(-5.0, None, Some("dairy"), Utc::now()).is_err());
    }

    #[test]
    fn reasoning_mentions_category() {
        let rec = recommend_in(10.0, 3, "dairy");
        assert!(rec.reasoning.len() > 10);
        assert!(rec.reasoning.contains("dairy"));
        assert!(!rec.urgency_label.is_empty());
    }
}
