//! Expiry date parsing shared by the urgency scorer and the price engine.
//! The two engines react differently to a *missing* date (neutral 0.5 vs a
//! 30-day lookback); this module only answers "how many whole days remain".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses an expiry string in any of the shapes callers actually send:
/// RFC 3339 with offset or `Z`, a bare date-time, or a plain `YYYY-MM-DD`
/// date (treated as midnight UTC). Returns `None` for anything else.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Whole days from `now` until expiry; negative when already past.
/// `None` when the string is missing or unparseable.
pub fn days_until(raw: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
    let expiry = parse_expiry(raw?)?;
    Some((expiry - now).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn plain_date_is_parsed() {
        let days = days_until(Some("2099-12-31"), now()).unwrap();
        assert!(days > 100);
    }

    #[test]
    fn rfc3339_with_z_suffix_is_parsed() {
        let raw = (now() + Duration::days(5)).format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let days = days_until(Some(&raw), now()).unwrap();
        assert!((4..=5).contains(&days));
    }

    #[test]
    fn bare_datetime_is_parsed() {
        let raw = (now() + Duration::days(5))
            .naive_utc()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        let days = days_until(Some(&raw), now()).unwrap();
        assert!((4..=5).contains(&days));
    }

    #[test]
    fn past_date_is_negative() {
        let raw = (now() - Duration::days(5)).to_rfc3339();
        let days = days_until(Some(&raw), now()).unwrap();
        assert!(days < 0);
    }

    #[test]
    fn missing_and_garbage_return_none() {
        assert_eq!(days_until(None, now()), None);
        assert_eq!(days_until(Some(""), now()), None);
        assert_eq!(days_until(Some("not-a-date"), now()), None);
    }
}
