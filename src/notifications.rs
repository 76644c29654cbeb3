//! Seller inventory alerts driven by expiry urgency.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scorer::{urgency, urgency_level};
use crate::types::Listing;

// --- thresholds -------------------------------------------------------------

const CRITICAL_URGENCY: f64 = 0.9;
const EXPIRING_SOON_URGENCY: f64 = 0.7;
const PLAN_AHEAD_URGENCY: f64 = 0.5;

const CRITICAL_DISCOUNT: f64 = 50.0;
const EXPIRING_SOON_DISCOUNT: f64 = 30.0;
const PLAN_AHEAD_DISCOUNT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub product_id: i64,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub priority: Priority,
    pub urgency_score: f64,
    pub urgency_level: &'static str,
    pub suggested_discount: f64,
    pub message: String,
}

fn classify(score: f64) -> Option<(&'static str, Priority, f64)> {
    if score >= CRITICAL_URGENCY {
        Some(("critical_expiry", Priority::High, CRITICAL_DISCOUNT))
    } else if score >= EXPIRING_SOON_URGENCY {
        Some(("expiring_soon", Priority::Medium, EXPIRING_SOON_DISCOUNT))
    } else if score >= PLAN_AHEAD_URGENCY {
        Some(("plan_ahead", Priority::Low, PLAN_AHEAD_DISCOUNT))
    } else {
        None
    }
}

fn message(kind: &str, title: &str, discount: f64) -> String {
    match kind {
        "critical_expiry" => format!(
            "{title} expires within a day. Apply a {discount:.0}% discount to move it now."
        ),
        "expiring_soon" => format!(
            "{title} is expiring soon. Consider a {discount:.0}% discount."
        ),
        _ => format!(
            "{title} will need attention this week. A {discount:.0}% discount could help."
        ),
    }
}

/// Scans a seller's products and emits one notification per item that needs
/// action, ordered high priority first. Items with comfortable shelf life
/// (or no expiry at all, which scores neutral) produce nothing.
pub fn analyze_inventory(products: &[Listing], now: DateTime<Utc>) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = products
        .iter()
        .filter_map(|product| {
            let score = urgency(product.expiry_date.as_deref(), now);
            let (kind, priority, discount) = classify(score)?;
            let title = product.title.as_deref().unwrap_or("This item");
            Some(Notification {
                product_id: product.id,
                title: product.title.clone(),
                kind,
                priority,
                urgency_score: score,
                urgency_level: urgency_level(score),
                suggested_discount: discount,
                message: message(kind, title, discount),
            })
        })
        .collect();
    // Stable sort keeps input order within a priority band.
    notifications.sort_by_key(|n| n.priority);
    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(id: i64, title: &str, expires_in_days: Option<i64>) -> Listing {
        let mut value = serde_json::json!({"id": id, "title": title});
        if let Some(days) = expires_in_days {
            value["expiryDate"] =
                serde_json::json!((Utc::now() + Duration::days(days)).to_rfc3339());
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn buckets_by_urgency_and_sorts_high_first() {
        let now = Utc::now();
        let products = vec![
            listing(1, "Aged cheddar", Some(6)),
            listing(2, "Fresh salmon", Some(0)),
            listing(3, "Canned beans", Some(90)),
            listing(4, "Greek yogurt", Some(2)),
        ];
        let notes = analyze_inventory(&products, now);

        assert_eq!(notes.len(), 3);
        assert_eq!(notes[0].product_id, 2);
        assert_eq!(notes[0].priority, Priority::High);
        assert_eq!(notes[0].kind, "critical_expiry");
        assert_eq!(notes[0].suggested_discount, 50.0);
        assert_eq!(notes[1].product_id, 4);
        assert_eq!(notes[1].suggested_discount, 30.0);
        assert_eq!(notes[2].product_id, 1);
        assert_eq!(notes[2].priority, Priority::Low);
        assert_eq!(notes[2].suggested_discount, 15.0);
    }

    #[test]
    fn missing_expiry_scores_neutral_and_becomes_plan_ahead() {
        let notes = analyze_inventory(&[listing(1, "Mystery jar", None)], Utc::now());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, "plan_ahead");
        assert_eq!(notes[0].urgency_score, 0.5);
    }

    #[test]
    fn long_shelf_life_is_silent() {
        let notes = analyze_inventory(&[listing(1, "Dry pasta", Some(180))], Utc::now());
        assert!(notes.is_empty());
    }

    #[test]
    fn messages_name_the_product_and_discount() {
        let notes = analyze_inventory(&[listing(1, "Fresh salmon", Some(0))], Utc::now());
        assert!(notes[0].message.contains("Fresh salmon"));
        assert!(notes[0].message.contains("50%"));
    }
}
