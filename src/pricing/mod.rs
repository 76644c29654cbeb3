pub mod recommender;

pub use recommender::{recommend, PriceRecommendation, DISCOUNT_TIERS};
