//! Learned price path: a trained discount regressor behind the adapter slot.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::MAX_DISCOUNT_CAP;
use crate::ml::artifacts::PriceModel;
use crate::ml::{MlOutcome, ModelSlot};
use crate::pricing::recommender::{assemble, days_until_expiry, PriceRecommendation};

pub struct PricePredictor {
    slot: ModelSlot<PriceModel>,
    models_dir: PathBuf,
}

impl PricePredictor {
    /// Creates the predictor and attempts an initial load. A missing model is
    /// normal at startup; the service runs on the rule-based path until a
    /// reload succeeds.
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        let predictor = Self {
            slot: ModelSlot::empty(),
            models_dir: models_dir.into(),
        };
        if predictor.reload() {
            info!("price model loaded at startup");
        } else {
            info!("no price model available, serving rule-based prices");
        }
        predictor
    }

    pub fn is_available(&self) -> bool {
        self.slot.is_loaded()
    }

    /// Re-reads the artifact from disk. On any failure the previously loaded
    /// model (if any) stays installed and `false` is returned.
    pub fn reload(&self) -> bool {
        match PriceModel::load(&self.models_dir) {
            Ok(model) => {
                self.slot.replace(Arc::new(model));
                true
            }
            Err(err) => {
                warn!(error = %err, dir = %self.models_dir.display(), "price model reload failed");
                false
            }
        }
    }

    /// Predicts a price bracket for a listing. Produces the exact response
    /// shape of the rule-based engine so callers can serve either.
    pub fn predict(
        &self,
        original_price: f64,
        expiry_date: Option<&str>,
        category: Option<&str>,
        quantity: Option<f64>,
        now: DateTime<Utc>,
    ) -> MlOutcome<PriceRecommendation> {
        let Some(model) = self.slot.get() else {
            return MlOutcome::unavailable("price model not loaded");
        };
        if !(original_price > 0.0) {
            return MlOutcome::unavailable("original_price must be a positive number");
        }

        let days = days_until_expiry(expiry_date, now);
        let category_label = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("other");

        let raw = model.intercept
            + model.per_day * days as f64
            + model.per_quantity * quantity.unwrap_or(1.0)
            + model.category_offset(category_label);
        if !raw.is_finite() {
            return MlOutcome::unavailable("model produced a non-finite discount");
        }
        let discount = raw.clamp(0.0, MAX_DISCOUNT_CAP);

        MlOutcome::Ready(assemble(original_price, discount, days, category_label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PRICE_FLOOR_RATIO;
    use std::fs;

    fn predictor_with(tag: &str, body: &str) -> PricePredictor {
        let dir = std::env::temp_dir().join(format!("recommender-price-{tag}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(crate::ml::artifacts::PRICE_MODEL_FILE), body).unwrap();
        PricePredictor::new(dir)
    }

    #[test]
    fn unloaded_predictor_reports_unavailable() {
        let dir = std::env::temp_dir().join("recommender-price-empty");
        fs::create_dir_all(&dir).unwrap();
        let _ = fs::remove_file(dir.join(crate::ml::artifacts::PRICE_MODEL_FILE));
        let predictor = PricePredictor::new(dir);
        assert!(!predictor.is_available());
        assert!(matches!(
            predictor.predict(10.0, None, None, None, Utc::now()),
            MlOutcome::Unavailable { .. }
        ));
    }

    #[test]
    fn failed_reload_keeps_previous_model() {
        let predictor = predictor_with(
            "keep",
            r#"{"intercept":0.3,"per_day":-0.01,"per_quantity":0.0}"#,
        );
        assert!(predictor.is_available());
        fs::write(
            predictor.models_dir.join(crate::ml::artifacts::PRICE_MODEL_FILE),
            "not json",
        )
        .unwrap();
        assert!(!predictor.reload());
        assert!(predictor.is_available());
    }

    #[test]
    fn predicted_bracket_holds_the_pricing_invariant() {
        let predictor = predictor_with(
            "bracket",
            r#"{"intercept":0.6,"per_day":-0.02,"per_quantity":0.001,
                "category_offsets":{"seafood":0.2}}"#,
        );
        let rec = match predictor.predict(
            20.0,
            Some(&Utc::now().to_rfc3339()),
            Some("seafood"),
            Some(5.0),
            Utc::now(),
        ) {
            MlOutcome::Ready(rec) => rec,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        let floor = 20.0 * PRICE_FLOOR_RATIO;
        assert!(rec.min_price >= floor);
        assert!(rec.min_price <= rec.recommended_price);
        assert!(rec.recommended_price <= rec.max_price);
        assert!(rec.max_price <= rec.original_price);
        assert!(rec.discount_percentage <= MAX_DISCOUNT_CAP * 100.0);
        assert_eq!(rec.category, "seafood");
    }

    #[test]
    fn discount_never_goes_negative() {
        let predictor = predictor_with(
            "negative",
            r#"{"intercept":-1.0,"per_day":0.0,"per_quantity":0.0}"#,
        );
        let rec = match predictor.predict(10.0, None, None, None, Utc::now()) {
            MlOutcome::Ready(rec) => rec,
            MlOutcome::Unavailable { reason } => panic!("unexpected fallback: {reason}"),
        };
        assert_eq!(rec.discount_percentage, 0.0);
        assert_eq!(rec.recommended_price, 10.0);
    }

    #[test]
    fn nonpositive_price_is_unavailable_not_a_panic() {
        let predictor = predictor_with(
            "badprice",
            r#"{"intercept":0.3,"per_day":0.0,"per_quantity":0.0}"#,
        );
        assert!(matches!(
            predictor.predict(0.0, None, None, None, Utc::now()),
            MlOutcome::Unavailable { .. }
        ));
    }
}
