//! Multi-factor similarity scoring: category relatedness, TF-IDF text
//! similarity, price proximity, geographic distance, and freshness proximity,
//! combined with fixed weights into a ranked, thresholded result list.

use tracing::debug;

use crate::config::{
    weights, DEFAULT_LIMIT, DEFAULT_NEUTRAL_SCORE, FRESHNESS_TOLERANCE_DAYS, MAX_CANDIDATES,
    MAX_DISTANCE_KM, MAX_RESULT_LIMIT, MIN_PRICE_EPSILON, PRICE_TOLERANCE_RATIO,
    SIMILARITY_THRESHOLD,
};
use crate::matcher::text;
use crate::types::{Category, Listing, MatchFactors, ScoredListing};
use crate::util::{round2, round3};

/// Applies `score` when both sides are present, otherwise the neutral 0.5.
/// Every sub-score funnels missing data through here so the neutral policy
/// cannot drift between factors.
fn both_or_neutral<A, B>(a: Option<A>, b: Option<B>, score: impl FnOnce(A, B) -> f64) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => score(a, b),
        _ => DEFAULT_NEUTRAL_SCORE,
    }
}

/// Exact match 1.0, listed-as-related 0.5, otherwise 0.0.
/// Missing category on either side is neutral 0.5, never a penalty.
pub fn category_score(target: Option<&str>, candidate: Option<&str>) -> f64 {
    fn clean(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }
    both_or_neutral(clean(target), clean(candidate), |t, c| {
        if t.eq_ignore_ascii_case(c) {
            return 1.0;
        }
        let (t, c) = (Category::parse(t), Category::parse(c));
        if t.related().contains(&c) {
            0.5
        } else {
            0.0
        }
    })
}

/// `1 - |Δprice| / max(target, ε) / tolerance`, clamped at zero. Reaches 0.0
/// at a 50% difference. Zero/negative prices count as missing.
pub fn price_score(target: Option<f64>, candidate: Option<f64>) -> f64 {
    let positive = |p: Option<f64>| p.filter(|p| *p > 0.0);
    both_or_neutral(positive(target), positive(candidate), |t, c| {
        let ratio = (t - c).abs() / t.max(MIN_PRICE_EPSILON);
        (1.0 - ratio / PRICE_TOLERANCE_RATIO).max(0.0)
    })
}

/// Linear falloff to zero at `MAX_DISTANCE_KM`; never negative.
pub fn distance_score(distance_km: Option<f64>) -> f64 {
    both_or_neutral(distance_km, Some(()), |d, ()| {
        (1.0 - d / MAX_DISTANCE_KM).max(0.0)
    })
}

/// Linear falloff to zero at a 7-day expiry-window difference.
pub fn freshness_score(target_days: Option<i64>, candidate_days: Option<i64>) -> f64 {
    both_or_neutral(target_days, candidate_days, |t, c| {
        let diff = (t - c).abs() as f64;
        (1.0 - diff / FRESHNESS_TOLERANCE_DAYS).max(0.0)
    })
}

/// A candidate is eligible unless it is the target itself or shares the
/// target's seller. Missing seller ids never exclude.
pub(crate) fn eligible(target: &Listing, candidate: &Listing) -> bool {
    if candidate.id == target.id {
        return false;
    }
    match (candidate.seller_id, target.seller_id) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

/// Ranked top-N similar listings for `target` out of `candidates`.
///
/// Candidates sharing the target's id or seller are silently dropped;
/// oversized pools and limits are clamped, not rejected. Results carry the
/// candidate's fields untouched plus the score and per-factor breakdown,
/// sorted descending (stable on ties), all above the similarity threshold.
pub fn find_similar(
    target: &Listing,
    candidates: &[Listing],
    limit: Option<usize>,
) -> Vec<ScoredListing> {
    let requested = limit.unwrap_or(DEFAULT_LIMIT);
    let limit = requested.min(MAX_RESULT_LIMIT);
    if requested > MAX_RESULT_LIMIT {
        debug!(requested, clamped = limit, "result limit clamped");
    }

    let mut pool: Vec<&Listing> = candidates
        .iter()
        .filter(|c| eligible(target, c))
        .collect();
    if pool.len() > MAX_CANDIDATES {
        debug!(
            candidates = pool.len(),
            kept = MAX_CANDIDATES,
            "candidate pool truncated"
        );
        pool.truncate(MAX_CANDIDATES);
    }
    if pool.is_empty() {
        return Vec::new();
    }

    // Document 0 is the target; text indices follow candidate order.
    let mut documents = Vec::with_capacity(pool.len() + 1);
    documents.push(target.document());
    documents.extend(pool.iter().map(|c| c.document()));
    let text_sims = text::target_similarities(&documents);

    let mut scored: Vec<(f64, MatchFactors, &Listing)> = pool
        .iter()
        .enumerate()
        .map(|(idx, candidate)| {
            let factors = MatchFactors {
                category: category_score(target.category.as_deref(), candidate.category.as_deref()),
                text: text_sims[idx + 1].clamp(0.0, 1.0),
                price: price_score(target.price, candidate.price),
                distance: distance_score(candidate.distance_km),
                freshness: freshness_score(target.days_until_expiry, candidate.days_until_expiry),
            };
            let combined = factors.category * weights::CATEGORY
                + factors.text * weights::TEXT
                + factors.price * weights::PRICE
                + factors.distance * weights::DISTANCE
                + factors.freshness * weights::FRESHNESS;
            (combined, factors, *candidate)
        })
        .filter(|(combined, _, _)| *combined >= SIMILARITY_THRESHOLD)
        .collect();

    // Stable sort preserves input order on equal scores.
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(combined, factors, candidate)| ScoredListing {
            listing: candidate.clone(),
            similarity_score: round3(combined),
            match_factors: MatchFactors {
                category: round2(factors.category),
                text: round2(factors.text),
                price: round2(factors.price),
                distance: round2(factors.distance),
                freshness: round2(factors.freshness),
            },
        })
        .collect()
}
