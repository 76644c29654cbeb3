//! Learned similarity path: a fitted vectorizer plus user affinity profiles.
//!
//! Ranks candidates by blending text similarity under the trained vocabulary
//! with the requesting user's category affinity. Applies the same candidate
//! exclusions as the rule-based matcher and emits the same scored shape, so
//! the serving layer can swap paths without callers noticing.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{DEFAULT_LIMIT, DEFAULT_NEUTRAL_SCORE, MAX_CANDIDATES, MAX_RESULT_LIMIT};
use crate::matcher::similarity::eligible;
use crate::matcher::text::{cosine_similarity, tokenize};
use crate::util::{round2, round3};
use crate::ml::artifacts::RecommendationModel;
use crate::ml::{MlOutcome, ModelSlot};
use crate::types::{Listing, MatchFactors, ScoredListing};

/// Blend between trained text similarity and category affinity.
const TEXT_BLEND: f64 = 0.7;
const AFFINITY_BLEND: f64 = 0.3;

#[derive(Debug)]
pub struct Recommendations {
    pub products: Vec<ScoredListing>,
    /// True when at least one score used the requesting user's own profile
    /// rather than global category weights.
    pub personalized: bool,
}

pub struct ProductRecommender {
    slot: ModelSlot<RecommendationModel>,
    models_dir: PathBuf,
}

impl ProductRecommender {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        let recommender = Self {
            slot: ModelSlot::empty(),
            models_dir: models_dir.into(),
        };
        if recommender.reload() {
            info!("recommendation model loaded at startup");
        } else {
            info!("no recommendation model available, serving rule-based matches");
        }
        recommender
    }

    pub fn is_available(&self) -> bool {
        self.slot.is_loaded()
    }

    /// Re-reads the artifact from disk. On any failure the previously loaded
    /// model (if any) stays installed and `false` is returned.
    pub fn reload(&self) -> bool {
        match RecommendationModel::load(&self.models_dir) {
            Ok(model) => {
                self.slot.replace(Arc::new(model));
                true
            }
            Err(err) => {
                warn!(
                    error = %err,
                    dir = %self.models_dir.display(),
                    "recommendation model reload failed"
                );
                false
            }
        }
    }

    pub fn recommend(
        &self,
        target: &Listing,
        candidates: &[Listing],
        user_id: Option<i64>,
        limit: Option<usize>,
    ) -> MlOutcome<Recommendations> {
        let Some(model) = self.slot.get() else {
            return MlOutcome::unavailable("recommendation model not loaded");
        };

        let requested = limit.unwrap_or(DEFAULT_LIMIT);
        let limit = requested.min(MAX_RESULT_LIMIT);
        if requested > MAX_RESULT_LIMIT {
            debug!(requested, clamped = limit, "result limit clamped");
        }

        let mut pool: Vec<&Listing> = candidates.iter().filter(|c| eligible(target, c)).collect();
        if pool.len() > MAX_CANDIDATES {
            debug!(
                candidates = pool.len(),
                kept = MAX_CANDIDATES,
                "candidate pool truncated"
            );
            pool.truncate(MAX_CANDIDATES);
        }
        if pool.is_empty() {
            return MlOutcome::Ready(Recommendations {
                products: Vec::new(),
                personalized: false,
            });
        }

        let target_vec = model.tfidf.transform(&tokenize(&target.document()));
        let mut personalized = false;

        let mut scored: Vec<(f64, MatchFactors, &Listing)> = pool
            .into_iter()
            .map(|candidate| {
                let candidate_vec = model.tfidf.transform(&tokenize(&candidate.document()));
                let text = cosine_similarity(&target_vec, &candidate_vec).clamp(0.0, 1.0);

                let category_label = candidate
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("other");
                let (affinity, from_profile) = model.affinity(user_id, category_label);
                personalized |= from_profile;

                let combined = text * TEXT_BLEND + affinity * AFFINITY_BLEND;
                let factors = MatchFactors {
                    category: affinity,
                    text,
                    price: DEFAULT_NEUTRAL_SCORE,
                    distance: DEFAULT_NEUTRAL_SCORE,
                    freshness: DEFAULT_NEUTRAL_SCORE,
                };
                (combined, factors, candidate)
            })
            .collect();

        // Stable sort preserves input order on equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        let products = scored
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
            .collect();

        MlOutcome::Ready(Recommendations {
            products,
            personalized,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MODEL: &str = r#"{
        "vocabulary": ["organic", "whole", "milk", "sourdough", "bread"],
        "idf": [1.2, 1.4, 1.1, 1.8, 1.3],
        "category_weights": {"dairy": 0.6, "bakery": 0.4},
        "user_preferences": {"7": {"bakery": 0.95}}
    }"#;

    fn recommender_with(tag: &str, body: &str) -> ProductRecommender {
        let dir = std::env::temp_dir().join(format!("recommender-products-{tag}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(crate::ml::artifacts::RECOMMENDATION_MODEL_FILE),
            body,
        )
        .unwrap();
        ProductRecommender::new(dir)
    }

    fn listing(v: serde_json::Value) -> Listing {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn unloaded_recommender_reports_unavailable() {
        let dir = std::env::temp_dir().join("recommender-products-empty");
        fs::create_dir_all(&dir).unwrap();
        let _ = fs::remove_file(dir.join(crate::ml::artifacts::RECOMMENDATION_MODEL_FILE));
        let recommender = ProductRecommender::new(dir);
        assert!(!recommender.is_available());
        let target = listing(serde_json::json!({"id": 1}));
        assert!(matches!(
            recommender.recommend(&target, &[], None, None),
            MlOutcome::Unavailable { .. }
        ));
    }

    #[test]
    fn text_overlap_ranks_first_and_exclusions_apply() {
        let recommender = recommender_with("rank", MODEL);
        let target = listing(serde_json::json!({
            "id": 1, "sellerId": 10, "title": "organic whole milk", "category": "dairy"
        }));
        let candidates = vec![
            listing(serde_json::json!({"id": 1, "title": "organic whole milk"})),
            listing(serde_json::json!({
                "id": 2, "sellerId": 10, "title": "organic whole milk", "category": "dairy"
            })),
            listing(serde_json::json!({
                "id": 3, "sellerId": 11, "title": "whole milk", "category": "dairy"
            })),
            listing(serde_json::json!({
                "id": 4, "sellerId": 12, "title": "sourdough bread", "category": "bakery"
            })),
        ];
        let recs = match recommender.recommend(&target, &candidates, None, None) {
            MlOutcome::Ready(recs) => recs,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        // Same id and same seller are dropped.
        assert_eq!(recs.products.len(), 2);
        assert_eq!(recs.products[0].listing.id, 3);
        assert!(recs.products[0].similarity_score > recs.products[1].similarity_score);
        assert!(!recs.personalized);
    }

    #[test]
    fn user_profile_marks_results_personalized() {
        let recommender = recommender_with("profile", MODEL);
        let target = listing(serde_json::json!({"id": 1, "title": "sourdough bread"}));
        let candidates = vec![listing(serde_json::json!({
            "id": 2, "title": "sourdough bread", "category": "bakery"
        }))];

        let with_profile = match recommender.recommend(&target, &candidates, Some(7), None) {
            MlOutcome::Ready(recs) => recs,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        assert!(with_profile.personalized);
        assert_eq!(with_profile.products[0].match_factors.category, 0.95);

        let without = match recommender.recommend(&target, &candidates, Some(99), None) {
            MlOutcome::Ready(recs) => recs,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        assert!(!without.personalized);
        assert_eq!(without.products[0].match_factors.category, 0.4);
    }

    #[test]
    fn out_of_vocabulary_text_still_scores_without_panicking() {
        let recommender = recommender_with("oov", MODEL);
        let target = listing(serde_json::json!({"id": 1, "title": "mystery casserole"}));
        let candidates = vec![listing(serde_json::json!({
            "id": 2, "title": "leftover surprise", "category": "other"
        }))];
        let recs = match recommender.recommend(&target, &candidates, None, None) {
            MlOutcome::Ready(recs) => recs,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        assert_eq!(recs.products.len(), 1);
        // Zero text overlap leaves only the affinity term.
        assert_eq!(recs.products[0].match_factors.text, 0.0);
    }
}
