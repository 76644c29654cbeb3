mod api;
mod buyer;
mod config;
mod error;
mod expiry;
mod matcher;
mod ml;
mod notifications;
mod pricing;
mod scorer;
mod types;
mod util;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::ml::{PricePredictor, ProductRecommender};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // Model adapters: missing artifacts are normal, the rule-based engines
    // cover every request until a reload succeeds.
    let state = Arc::new(ApiState {
        price_predictor: PricePredictor::new(&cfg.models_dir),
        product_recommender: ProductRecommender::new(&cfg.models_dir),
    });
    info!(
        models_dir = %cfg.models_dir,
        price_model = state.price_predictor.is_available(),
        recommendation_model = state.product_recommender.is_available(),
        "recommendation engine ready"
    );

    let app = router(state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
