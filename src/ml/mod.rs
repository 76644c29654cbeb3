//! Learned-model adapters and the fallback boundary.
//!
//! Each adapter wraps optional trained artifacts behind an atomically
//! swappable slot. Unavailability or internal failure is reported as a value
//! (`MlOutcome::Unavailable`), never as a panic across the boundary, so the
//! serving layer can unconditionally fall back to the deterministic engines.

pub mod artifacts;
pub mod price_predictor;
pub mod product_recommender;

pub use price_predictor::PricePredictor;
pub use product_recommender::ProductRecommender;

use std::sync::{Arc, RwLock};

/// Outcome of a learned-model call: either a result to serve tagged
/// `ml_model`, or a reason to fall back.
#[derive(Debug)]
pub enum MlOutcome<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> MlOutcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MlOutcome::Unavailable { reason: reason.into() }
    }
}

/// Holder for loaded model artifacts. `replace` swaps the inner `Arc` under
/// a short write lock, so concurrent readers either see the previous
/// artifacts or the new ones, never a half-loaded state.
#[derive(Debug)]
pub struct ModelSlot<T> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T> ModelSlot<T> {
    pub fn empty() -> Self {
        Self { inner: RwLock::new(None) }
    }

    /// Snapshot of the currently loaded artifacts, if any. The lock is
    /// released before the caller starts scoring.
    pub fn get(&self) -> Option<Arc<T>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace(&self, value: Arc<T>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(value),
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.get().is_some()
    }
}
