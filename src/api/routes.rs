//! HTTP surface. Handlers do structural validation and provenance-tagged
//! dispatch between the learned and rule-based paths; all scoring lives in
//! the engine modules.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::buyer::{find_matches, BuyerMatch, BuyerPreferences};
use crate::config::SIMILARITY_THRESHOLD;
use crate::error::{AppError, Result};
use crate::matcher::find_similar;
use crate::ml::{MlOutcome, PricePredictor, ProductRecommender};
use crate::notifications::{analyze_inventory, Notification};
use crate::pricing;
use crate::pricing::PriceRecommendation;
use crate::scorer::{urgency, urgency_level};
use crate::types::{Listing, ScoredListing, Source};

pub struct ApiState {
    pub price_predictor: PricePredictor,
    pub product_recommender: ProductRecommender,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/recommendations/price", post(recommend_price))
        .route("/api/v1/recommendations/similar", post(similar_products))
        .route("/api/v1/recommendations/urgency", post(urgency_scores))
        .route(
            "/api/v1/recommendations/seller/notifications",
            post(seller_notifications),
        )
        .route("/api/v1/recommendations/buyer/matches", post(buyer_matches))
        .route("/api/v1/models/status", get(models_status))
        .route("/api/v1/models/reload", post(models_reload))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "service": "recommendation-engine"}))
}

// --- price ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PriceRequest {
    #[serde(default, alias = "originalPrice")]
    original_price: Option<f64>,
    #[serde(default, alias = "expiryDate")]
    expiry_date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    quantity: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PriceResponse {
    #[serde(flatten)]
    recommendation: PriceRecommendation,
    source: Source,
}

async fn recommend_price(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<PriceRequest>,
) -> Result<Json<PriceResponse>> {
    let price = req
        .original_price
        .filter(|p| *p > 0.0)
        .ok_or_else(|| AppError::InvalidInput("original_price must be a positive number".into()))?;

    let now = Utc::now();
    let outcome = state.price_predictor.predict(
        price,
        req.expiry_date.as_deref(),
        req.category.as_deref(),
        req.quantity,
        now,
    );
    let (recommendation, source) = match outcome {
        MlOutcome::Ready(rec) => (rec, Source::MlModel),
        MlOutcome::Unavailable { reason } => {
            info!(source = %Source::Error, reason = %reason, "price model unavailable, using rule-based engine");
            let rec = pricing::recommend(
                price,
                req.expiry_date.as_deref(),
                req.category.as_deref(),
                now,
            )?;
            (rec, Source::RuleBased)
        }
    };

    Ok(Json(PriceResponse {
        recommendation,
        source,
    }))
}

// --- similar ----------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SimilarRequest {
    #[serde(default)]
    target: Option<Listing>,
    #[serde(default)]
    candidates: Option<Vec<Listing>>,
    #[serde(default, alias = "userId")]
    user_id: Option<i64>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SimilarResponse {
    similar_products: Vec<ScoredListing>,
    count: usize,
    threshold: f64,
    source: Source,
    personalized: bool,
}

async fn similar_products(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<SimilarRequest>,
) -> Result<Json<SimilarResponse>> {
    let target = req
        .target
        .ok_or_else(|| AppError::InvalidInput("target product is required".into()))?;
    let candidates = req
        .candidates
        .ok_or_else(|| AppError::InvalidInput("candidates list is required".into()))?;

    let outcome = state
        .product_recommender
        .recommend(&target, &candidates, req.user_id, req.limit);
    let response = match outcome {
        MlOutcome::Ready(recs) => SimilarResponse {
            count: recs.products.len(),
            similar_products: recs.products,
            threshold: SIMILARITY_THRESHOLD,
            source: Source::MlModel,
            personalized: recs.personalized,
        },
        MlOutcome::Unavailable { reason } => {
            info!(source = %Source::Error, reason = %reason, "recommendation model unavailable, using rule-based matcher");
            let products = find_similar(&target, &candidates, req.limit);
            SimilarResponse {
                count: products.len(),
                similar_products: products,
                threshold: SIMILARITY_THRESHOLD,
                source: Source::RuleBased,
                personalized: false,
            }
        }
    };

    Ok(Json(response))
}

// --- urgency ----------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UrgencyRequest {
    #[serde(default)]
    items: Option<Vec<Listing>>,
}

#[derive(Debug, Serialize)]
struct UrgencyScore {
    id: i64,
    urgency_score: f64,
    urgency_level: &'static str,
}

#[derive(Debug, Serialize)]
struct UrgencyResponse {
    items: Vec<UrgencyScore>,
    count: usize,
}

async fn urgency_scores(Json(req): Json<UrgencyRequest>) -> Result<Json<UrgencyResponse>> {
    let items = req
        .items
        .ok_or_else(|| AppError::InvalidInput("items list is required".into()))?;

    let now = Utc::now();
    let items: Vec<UrgencyScore> = items
        .iter()
        .map(|item| {
            let score = urgency(item.expiry_date.as_deref(), now);
            UrgencyScore {
                id: item.id,
                urgency_score: score,
                urgency_level: urgency_level(score),
            }
        })
        .collect();

    Ok(Json(UrgencyResponse {
        count: items.len(),
        items,
    }))
}

// --- seller notifications ---------------------------------------------------

#[derive(Debug, Deserialize)]
struct NotificationsRequest {
    #[serde(default)]
    products: Option<Vec<Listing>>,
}

#[derive(Debug, Serialize)]
struct NotificationsResponse {
    notifications: Vec<Notification>,
    count: usize,
}

async fn seller_notifications(
    Json(req): Json<NotificationsRequest>,
) -> Result<Json<NotificationsResponse>> {
    let products = req
        .products
        .ok_or_else(|| AppError::InvalidInput("products list is required".into()))?;

    let notifications = analyze_inventory(&products, Utc::now());
    Ok(Json(NotificationsResponse {
        count: notifications.len(),
        notifications,
    }))
}

// --- buyer matches ----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BuyerMatchesRequest {
    #[serde(default)]
    preferences: Option<BuyerPreferences>,
    #[serde(default)]
    listings: Option<Vec<Listing>>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct BuyerMatchesResponse {
    matches: Vec<BuyerMatch>,
    count: usize,
}

async fn buyer_matches(
    Json(req): Json<BuyerMatchesRequest>,
) -> Result<Json<BuyerMatchesResponse>> {
    let preferences = req
        .preferences
        .ok_or_else(|| AppError::InvalidInput("preferences are required".into()))?;
    let listings = req
        .listings
        .ok_or_else(|| AppError::InvalidInput("listings list is required".into()))?;

    let matches = find_matches(&preferences, &listings, req.limit, Utc::now());
    Ok(Json(BuyerMatchesResponse {
        count: matches.len(),
        matches,
    }))
}

// --- model management -------------------------------------------------------

async fn models_status(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({
        "price_model": {"loaded": state.price_predictor.is_available()},
        "recommendation_model": {"loaded": state.product_recommender.is_available()},
    }))
}

async fn models_reload(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let price = state.price_predictor.reload();
    let recommendation = state.product_recommender.reload();
    info!(price, recommendation, "model reload requested");
    Json(json!({
        "price_model": price,
        "recommendation_model": recommendation,
    }))
}
