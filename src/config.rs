use crate::error::{AppError, Result};

/// Minimum combined weighted score for a candidate to appear in results.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Hard cap on the candidate pool per request. Larger inputs are truncated,
/// never rejected.
pub const MAX_CANDIDATES: usize = 500;

/// Hard cap on how many results a single request may ask for.
pub const MAX_RESULT_LIMIT: usize = 50;

/// Result count when the caller does not specify a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Neutral score substituted whenever either side of a comparison is missing.
/// The domain expects partial records; missing data must never score as 0.
pub const DEFAULT_NEUTRAL_SCORE: f64 = 0.5;

/// Price difference (as a fraction of the target price) at which the price
/// sub-score reaches zero.
pub const PRICE_TOLERANCE_RATIO: f64 = 0.5;

/// Guards division by zero/negative target prices in the price sub-score.
pub const MIN_PRICE_EPSILON: f64 = 0.01;

/// Distance at which the distance sub-score reaches zero.
pub const MAX_DISTANCE_KM: f64 = 10.0;

/// Expiry-window difference at which the freshness sub-score reaches zero.
pub const FRESHNESS_TOLERANCE_DAYS: f64 = 7.0;

/// Sentinel document for listings with blank title and description, so an
/// empty-text listing still gets a defined (non-NaN) text similarity.
pub const EMPTY_TEXT_SENTINEL: &str = "unknown";

/// Fixed weights for the five similarity factors. Must sum to 1.0 (verified
/// by test), never learned per-request.
pub mod weights {
    pub const CATEGORY: f64 = 0.35;
    pub const TEXT: f64 = 0.25;
    pub const PRICE: f64 = 0.15;
    pub const DISTANCE: f64 = 0.15;
    pub const FRESHNESS: f64 = 0.10;
}

/// Minimum buyer-preference match score for a listing to be surfaced.
pub const BUYER_MATCH_THRESHOLD: f64 = 0.3;

/// Assumed search radius when the buyer sets no `max_distance_km`.
pub const BUYER_DEFAULT_MAX_DISTANCE_KM: f64 = 10.0;

/// Assumed listing distance when the listing carries none.
pub const BUYER_DEFAULT_DISTANCE_KM: f64 = 5.0;

/// Days of remaining shelf life that count as fully fresh to a buyer.
pub const BUYER_FRESHNESS_HORIZON_DAYS: f64 = 7.0;

/// Fixed weights for the buyer preference-match factors. Sum to 1.0; the
/// price factor can earn up to 1.5x its weight for deep savings, so the
/// final score is capped at 1.0.
pub mod buyer_weights {
    pub const CATEGORY: f64 = 0.30;
    pub const PRICE: f64 = 0.25;
    pub const DISTANCE: f64 = 0.25;
    pub const FRESHNESS: f64 = 0.20;
}

/// Urgency step function: `(max_days, score)` pairs checked in order, first
/// band with `days <= max_days` wins. Days past the last band score
/// [`URGENCY_FLOOR`]. Negative days (already expired) land in the first band.
pub const URGENCY_BANDS: &[(i64, f64)] = &[(0, 1.0), (1, 0.95), (3, 0.8), (7, 0.5), (14, 0.3)];

/// Urgency for items comfortably far from expiry.
pub const URGENCY_FLOOR: f64 = 0.1;

/// Urgency when the expiry date is missing or unparseable. NOT the same
/// policy as [`DEFAULT_EXPIRY_DAYS`]: the price engine assumes a 30-day
/// shelf life instead, and the two defaults must stay distinct.
pub const URGENCY_NEUTRAL: f64 = 0.5;

/// Assumed days-until-expiry when the price engine gets no usable date.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Hard ceiling on the total discount, regardless of category or urgency.
pub const MAX_DISCOUNT_CAP: f64 = 0.75;

/// Recommended and minimum prices never drop below this fraction of the
/// original price, even at maximum urgency and perishability.
pub const PRICE_FLOOR_RATIO: f64 = 0.25;

/// How strongly category perishability shifts the tier's midpoint discount.
pub const CATEGORY_ADJUSTMENT_WEIGHT: f64 = 0.5;

/// Multiplier producing the aggressive end of the price bracket (min_price).
pub const MIN_PRICE_DISCOUNT_STRETCH: f64 = 1.25;

/// Multiplier producing the conservative end of the bracket (max_price).
pub const MAX_PRICE_DISCOUNT_RELIEF: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Directory holding learned-model artifact files (MODELS_DIR).
    pub models_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "models".to_string()),
        })
    }
}
