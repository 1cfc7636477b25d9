use std::sync::Arc;

use crate::{
    models::MetadataSnapshot,
    services::providers::MetadataProvider,
    store::SimilarityStore,
};

pub const DEFAULT_RECOMMENDATION_COUNT: usize = 5;

/// Ranked recommendations for one title
///
/// `names` and `details` are index-aligned. Both are empty when nothing could
/// be recommended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub names: Vec<String>,
    pub details: Vec<MetadataSnapshot>,
    /// Non-fatal problems met while enriching, e.g. a failed metadata fetch
    pub notices: Vec<String>,
}

impl Recommendations {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<MetadataSnapshot>) {
        (self.names, self.details)
    }
}

/// Looks up nearest neighbors and enriches them with provider metadata
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<SimilarityStore>,
    provider: Arc<dyn MetadataProvider>,
    limit: usize,
}

impl RecommendationEngine {
    pub fn new(store: Arc<SimilarityStore>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            store,
            provider,
            limit: DEFAULT_RECOMMENDATION_COUNT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn store(&self) -> &SimilarityStore {
        &self.store
    }

    /// Recommends up to `limit` titles similar to `title`
    ///
    /// Metadata is fetched one neighbor at a time in rank order. An unknown
    /// title yields an empty result instead of an error.
    pub async fn recommend(&self, title: &str) -> Recommendations {
        let neighbors = match self.store.neighbors(title, self.limit) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                tracing::warn!(title = %title, error = %e, "No recommendations produced");
                return Recommendations::default();
            }
        };

        let mut recommendations = Recommendations::default();

        for neighbor in neighbors {
            let lookup = self.provider.lookup(neighbor.movie_id).await;
            if let Some(notice) = lookup.notice() {
                recommendations.notices.push(notice);
            }
            recommendations.names.push(neighbor.title.clone());
            recommendations.details.push(lookup.into_snapshot());
        }

        tracing::info!(
            title = %title,
            results = recommendations.len(),
            degraded = recommendations.notices.len(),
            provider = self.provider.name(),
            "Recommendations generated"
        );

        recommendations
    }
}
