/// Movie metadata provider abstraction
///
/// The recommendation engine only needs display metadata for a movie ID. Keeping
/// the source behind a trait lets tests swap in a mock and keeps TMDB details
/// out of the engine.
use crate::models::{MetadataLookup, MetadataSnapshot};

pub mod tmdb;

/// Trait for movie metadata providers
///
/// Lookups never fail: providers substitute a fallback snapshot and say why.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolve display metadata for a movie
    async fn lookup(&self, movie_id: u64) -> MetadataLookup;

    /// Like `lookup`, discarding whether a fallback was used
    async fn fetch(&self, movie_id: u64) -> MetadataSnapshot {
        self.lookup(movie_id).await.into_snapshot()
    }

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
