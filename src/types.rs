use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed set of marketplace categories. Anything unrecognized folds into
/// `Other` for scoring, but the caller's raw string is echoed in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Bakery,
    Frozen,
    Canned,
    Beverages,
    Snacks,
    Condiments,
    Pantry,
    Other,
}

impl Category {
    /// Case-insensitive parse; unknown labels map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "produce" => Category::Produce,
            "dairy" => Category::Dairy,
            "meat" => Category::Meat,
            "seafood" => Category::Seafood,
            "bakery" => Category::Bakery,
            "frozen" => Category::Frozen,
            "canned" => Category::Canned,
            "beverages" => Category::Beverages,
            "snacks" => Category::Snacks,
            "condiments" => Category::Condiments,
            "pantry" => Category::Pantry,
            _ => Category::Other,
        }
    }

    /// Fixed relatedness adjacency used by the category sub-score.
    /// The table is asymmetric; do not assume `a.related()`
    /// containing `b` implies the reverse.
    pub fn related(self) -> &'static [Category] {
        use Category::*;
        match self {
            Produce => &[Frozen, Canned],
            Dairy => &[Beverages],
            Meat => &[Frozen, Seafood],
            Seafood => &[Frozen, Meat],
            Bakery => &[Snacks],
            Frozen => &[Produce, Meat, Seafood],
            Canned => &[Pantry, Produce],
            Beverages => &[Dairy],
            Snacks => &[Bakery],
            Condiments => &[Pantry],
            Pantry => &[Canned, Condiments],
            Other => &[],
        }
    }

    /// Freshness-retention factor in (0, 1]. Lower = faster decay = larger
    /// discount adjustment in the price engine.
    pub fn perishability(self) -> f64 {
        match self {
            Category::Seafood => 0.80,
            Category::Meat | Category::Produce => 0.85,
            Category::Dairy | Category::Bakery | Category::Other => 0.90,
            Category::Frozen | Category::Beverages | Category::Snacks => 0.95,
            Category::Condiments => 0.96,
            Category::Pantry => 0.97,
            Category::Canned => 0.98,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::Produce => "produce",
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::Seafood => "seafood",
            Category::Bakery => "bakery",
            Category::Frozen => "frozen",
            Category::Canned => "canned",
            Category::Beverages => "beverages",
            Category::Snacks => "snacks",
            Category::Condiments => "condiments",
            Category::Pantry => "pantry",
            Category::Other => "other",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// A marketplace listing, target or candidate. Only the named fields are
/// ever scored on; everything else the caller sends rides along in `extra`
/// and is echoed unmodified in results (quantity, unit, images, pickup
/// location, seller info, status, timestamps, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    #[serde(rename = "sellerId", default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
    /// Raw expiry timestamp string, parsed leniently by the urgency and
    /// pricing paths. Freshness scoring uses `days_until_expiry` instead.
    #[serde(rename = "expiryDate", default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    /// Candidate-only, non-negative kilometers from the requesting buyer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// Display fields the engine must pass through but never score on.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Listing {
    /// Document text for the similarity vector space. Category is scored by
    /// its own factor and is deliberately not part of the text signal.
    pub fn document(&self) -> String {
        let title = self.title.as_deref().unwrap_or("");
        let description = self.description.as_deref().unwrap_or("");
        format!("{title} {description}").trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Scored results
// ---------------------------------------------------------------------------

/// Per-factor breakdown attached to every result. Callers must be able to
/// explain why two items matched, so this is a hard part of the contract.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchFactors {
    pub category: f64,
    pub text: f64,
    pub price: f64,
    pub distance: f64,
    pub freshness: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub similarity_score: f64,
    pub match_factors: MatchFactors,
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Marks whether a result came from the learned model, the deterministic
/// fallback, or an adapter failure (the caller then falls back itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    MlModel,
    RuleBased,
    Error,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Source::MlModel => "ml_model",
            Source::RuleBased => "rule_based",
            Source::Error => "error",
        };
        write!(f, "{s}")
    }
}
