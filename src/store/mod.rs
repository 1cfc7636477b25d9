//! Read-only catalog and similarity matrix, loaded once at startup.
pub mod loader;
pub mod similarity;

pub use loader::load_catalog;
pub use similarity::SimilarityStore;
