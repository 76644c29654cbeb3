pub mod similarity;
pub mod text;

pub use similarity::find_similar;
