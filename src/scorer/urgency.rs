//! Expiry urgency scoring: maps an expiry timestamp to a [0,1] scalar.
//! Consumed by the pricing reasoning, the urgency endpoint, and seller
//! notifications.

use chrono::{DateTime, Utc};

use crate::config::{URGENCY_BANDS, URGENCY_FLOOR, URGENCY_NEUTRAL};
use crate::expiry;

/// Urgency in [0,1]; 1.0 = expired or expiring today, 0.1 = long shelf life.
///
/// Missing or unparseable dates score the neutral 0.5, NOT the price
/// engine's 30-day assumption; the two policies are intentionally separate.
pub fn urgency(expiry_date: Option<&str>, now: DateTime<Utc>) -> f64 {
    let Some(days) = expiry::days_until(expiry_date, now) else {
        return URGENCY_NEUTRAL;
    };
    for &(max_days, score) in URGENCY_BANDS {
        if days <= max_days {
            return score;
        }
    }
    URGENCY_FLOOR
}

/// Human-readable bucket for an urgency score.
pub fn urgency_level(score: f64) -> &'static str {
    if score >= 0.9 {
        "critical"
    } else if score >= 0.7 {
        "high"
    } else if score >= 0.4 {
        "medium"
    } else {
        "low"
    }
}
