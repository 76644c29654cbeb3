pub mod urgency;

pub use urgency::{urgency, urgency_level};
