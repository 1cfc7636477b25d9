pub mod http;
pub mod providers;
pub mod recommendations;
pub mod title_search;

pub use recommendations::{RecommendationEngine, Recommendations};
