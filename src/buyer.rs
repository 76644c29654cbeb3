//! Buyer preference matching: scores listings against a buyer's saved
//! preferences (categories, budget, radius, freshness floor) and produces
//! ranked match notifications. The demand-side counterpart of the seller
//! inventory alerts in `notifications`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{
    buyer_weights, BUYER_DEFAULT_DISTANCE_KM, BUYER_DEFAULT_MAX_DISTANCE_KM,
    BUYER_FRESHNESS_HORIZON_DAYS, BUYER_MATCH_THRESHOLD, DEFAULT_LIMIT, MAX_RESULT_LIMIT,
};
use crate::expiry;
use crate::notifications::Priority;
use crate::scorer::urgency;
use crate::types::Listing;
use crate::util::round2;

const PERFECT_MATCH_SCORE: f64 = 0.8;
const GOOD_DEAL_SCORE: f64 = 0.6;
const HIGH_PRIORITY_SCORE: f64 = 0.7;
const ACT_FAST_URGENCY: f64 = 0.8;

/// What the buyer is shopping for. Every field is optional; an empty
/// preference set still produces scores via the neutral credits below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyerPreferences {
    #[serde(default)]
    pub preferred_categories: Vec<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub min_days_until_expiry: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyerNotification {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: Priority,
    pub message: String,
    pub listing_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuyerMatch {
    pub listing: Listing,
    pub match_score: f64,
    pub notification: BuyerNotification,
}

/// Preference-match score in [0, 1].
///
/// Unset preferences earn half credit on their factor (no preference is not
/// a mismatch), but a listing that misses a *stated* preference earns
/// nothing on it: over budget, outside the radius, or fresher-than floor
/// violations are hard misses, and a listing with no expiry date earns no
/// freshness credit at all.
pub fn score_match(listing: &Listing, prefs: &BuyerPreferences, now: DateTime<Utc>) -> f64 {
    let mut score = 0.0;

    if prefs.preferred_categories.is_empty() {
        score += buyer_weights::CATEGORY * 0.5;
    } else if let Some(category) = listing.category.as_deref() {
        let wanted = prefs
            .preferred_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category.trim()));
        if wanted {
            score += buyer_weights::CATEGORY;
        }
    }

    match (
        prefs.max_price.filter(|p| *p > 0.0),
        listing.price.filter(|p| *p > 0.0),
    ) {
        (Some(max), Some(price)) => {
            if price <= max {
                // Deeper savings score higher; up to 1.5x the factor weight.
                score += buyer_weights::PRICE * (1.0 - price / max + 0.5);
            }
        }
        _ => score += buyer_weights::PRICE * 0.5,
    }

    let max_distance = prefs
        .max_distance_km
        .unwrap_or(BUYER_DEFAULT_MAX_DISTANCE_KM);
    let distance = listing.distance_km.unwrap_or(BUYER_DEFAULT_DISTANCE_KM);
    if max_distance > 0.0 && distance <= max_distance {
        score += buyer_weights::DISTANCE * (1.0 - distance / max_distance);
    }

    let min_days = prefs.min_days_until_expiry.unwrap_or(0);
    if let Some(days) = expiry::days_until(listing.expiry_date.as_deref(), now) {
        if days >= min_days {
            score +=
                buyer_weights::FRESHNESS * (days as f64 / BUYER_FRESHNESS_HORIZON_DAYS).min(1.0);
        }
    }

    score.min(1.0)
}

fn notification(listing: &Listing, score: f64, now: DateTime<Utc>) -> BuyerNotification {
    let title = listing.title.as_deref().unwrap_or("This listing");
    let mut message = if score >= PERFECT_MATCH_SCORE {
        format!("Perfect match! {title} at a great price.")
    } else if score >= GOOD_DEAL_SCORE {
        format!("Good deal: {title} matches your preferences.")
    } else {
        format!("You might like: {title}")
    };
    if urgency(listing.expiry_date.as_deref(), now) >= ACT_FAST_URGENCY {
        message.push_str(" Act fast, it is expiring soon!");
    }

    BuyerNotification {
        kind: "match_found",
        priority: if score >= HIGH_PRIORITY_SCORE {
            Priority::High
        } else {
            Priority::Medium
        },
        message,
        listing_id: listing.id,
    }
}

/// Ranked listings matching the buyer's preferences, best first, filtered
/// at the match threshold and truncated to `limit`.
pub fn find_matches(
    prefs: &BuyerPreferences,
    listings: &[Listing],
    limit: Option<usize>,
    now: DateTime<Utc>,
) -> Vec<BuyerMatch> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_RESULT_LIMIT);

    let mut matches: Vec<BuyerMatch> = listings
        .iter()
        .filter_map(|listing| {
            let score = score_match(listing, prefs, now);
            if score < BUYER_MATCH_THRESHOLD {
                return None;
            }
            Some(BuyerMatch {
                listing: listing.clone(),
                match_score: round2(score),
                notification: notification(listing, score, now),
            })
        })
        .collect();

    // Stable sort preserves input order on equal scores.
    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(limit);
    matches
}
