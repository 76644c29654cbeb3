//! Small shared helpers.

/// Output rounding for scores and prices. Every 2-dp field in a response
/// goes through here so the policy cannot drift between engines.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// 3-dp rounding for combined similarity scores.
pub(crate) fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
