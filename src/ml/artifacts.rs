//! On-disk model artifacts.
//!
//! Training happens offline; this service only consumes exported JSON files
//! from the models directory. Loading validates shape up front so scoring
//! never has to re-check lengths or key types.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use dashmap::DashMap;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::matcher::text::TfIdf;

pub const PRICE_MODEL_FILE: &str = "price_model.json";
pub const RECOMMENDATION_MODEL_FILE: &str = "recommendation_model.json";

// --- price model ------------------------------------------------------------

/// Linear discount regressor exported by the training pipeline. Predicts a
/// discount rate from days-until-expiry, quantity, and a per-category offset.
#[derive(Debug, Deserialize)]
pub struct PriceModel {
    pub intercept: f64,
    pub per_day: f64,
    pub per_quantity: f64,
    #[serde(default)]
    pub category_offsets: HashMap<String, f64>,
}

impl PriceModel {
    pub fn load(dir: &Path) -> Result<Self> {
        let raw = fs::read_to_string(dir.join(PRICE_MODEL_FILE))?;
        let model: PriceModel = serde_json::from_str(&raw)?;
        let coeffs = [model.intercept, model.per_day, model.per_quantity];
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(AppError::InvalidInput(
                "price model has non-finite coefficients".to_string(),
            ));
        }
        Ok(model)
    }

    pub fn category_offset(&self, category: &str) -> f64 {
        self.category_offsets
            .get(&category.to_lowercase())
            .copied()
            .unwrap_or(0.0)
    }
}

// --- recommendation model ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct RecommendationModelFile {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    #[serde(default)]
    category_weights: HashMap<String, f64>,
    /// User id (as a JSON object key) to per-category affinity in [0, 1].
    #[serde(default)]
    user_preferences: HashMap<String, HashMap<String, f64>>,
}

/// Fitted vectorizer plus affinity tables, ready for concurrent scoring.
#[derive(Debug)]
pub struct RecommendationModel {
    pub tfidf: TfIdf,
    pub category_weights: HashMap<String, f64>,
    pub user_preferences: DashMap<i64, HashMap<String, f64>>,
}

impl RecommendationModel {
    pub fn load(dir: &Path) -> Result<Self> {
        let raw = fs::read_to_string(dir.join(RECOMMENDATION_MODEL_FILE))?;
        let file: RecommendationModelFile = serde_json::from_str(&raw)?;
        if file.vocabulary.len() != file.idf.len() {
            return Err(AppError::InvalidInput(format!(
                "vocabulary/idf length mismatch: {} vs {}",
                file.vocabulary.len(),
                file.idf.len()
            )));
        }
        if file.vocabulary.is_empty() {
            return Err(AppError::InvalidInput(
                "recommendation model has an empty vocabulary".to_string(),
            ));
        }

        let user_preferences = DashMap::new();
        for (key, prefs) in file.user_preferences {
            match key.parse::<i64>() {
                Ok(user_id) => {
                    user_preferences.insert(user_id, prefs);
                }
                Err(_) => warn!(key = %key, "skipping non-numeric user id in preferences"),
            }
        }

        Ok(RecommendationModel {
            tfidf: TfIdf::from_parts(file.vocabulary, file.idf),
            category_weights: file.category_weights,
            user_preferences,
        })
    }

    /// Affinity of `user_id` (if known) or the global audience for a
    /// category. Unknown categories fall back to a neutral 0.5.
    pub fn affinity(&self, user_id: Option<i64>, category: &str) -> (f64, bool) {
        let category = category.to_lowercase();
        if let Some(id) = user_id {
            if let Some(prefs) = self.user_preferences.get(&id) {
                if let Some(&score) = prefs.get(&category) {
                    return (score.clamp(0.0, 1.0), true);
                }
            }
        }
        let global = self
            .category_weights
            .get(&category)
            .copied()
            .unwrap_or(crate::config::DEFAULT_NEUTRAL_SCORE);
        (global.clamp(0.0, 1.0), false)
    }
}
