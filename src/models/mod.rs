use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;

pub const NO_API_KEY_POSTER: &str = "https://via.placeholder.com/500x750?text=No+API+Key";
pub const NO_IMAGE_POSTER: &str = "https://via.placeholder.com/500x750?text=No+Image+Available";

/// One row of the movie catalog
///
/// `index` is the row position in the similarity matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub index: usize,
    pub movie_id: u64,
    pub title: String,
}

/// Runtime in minutes, or `N/A` when the service does not know it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Minutes(u32),
    Unknown,
}

impl Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Runtime::Minutes(minutes) => write!(f, "{}", minutes),
            Runtime::Unknown => write!(f, "N/A"),
        }
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Runtime::Minutes(minutes) => serializer.serialize_u32(*minutes),
            Runtime::Unknown => serializer.serialize_str("N/A"),
        }
    }
}

/// Display metadata for one movie. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataSnapshot {
    pub poster_url: String,
    pub overview: String,
    pub release_date: String,
    /// In [0.0, 10.0], one decimal place
    pub rating: f64,
    pub runtime: Runtime,
}

impl MetadataSnapshot {
    /// Returned without touching the network when no API key is configured
    pub fn missing_api_key() -> Self {
        Self {
            poster_url: NO_API_KEY_POSTER.to_string(),
            overview: "API key not configured".to_string(),
            release_date: "Unknown".to_string(),
            rating: 0.0,
            runtime: Runtime::Unknown,
        }
    }

    /// Returned when the metadata service could not be reached or answered badly
    pub fn unavailable() -> Self {
        Self {
            poster_url: NO_IMAGE_POSTER.to_string(),
            overview: "Unable to fetch movie details".to_string(),
            release_date: "Unknown".to_string(),
            rating: 0.0,
            runtime: Runtime::Unknown,
        }
    }
}

/// Why a fallback snapshot was substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    MissingApiKey,
    Unavailable(String),
}

/// Outcome of a metadata lookup
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataLookup {
    Resolved(MetadataSnapshot),
    Fallback {
        movie_id: u64,
        snapshot: MetadataSnapshot,
        reason: FallbackReason,
    },
}

impl MetadataLookup {
    pub fn missing_api_key(movie_id: u64) -> Self {
        MetadataLookup::Fallback {
            movie_id,
            snapshot: MetadataSnapshot::missing_api_key(),
            reason: FallbackReason::MissingApiKey,
        }
    }

    pub fn unavailable(movie_id: u64, error: impl Into<String>) -> Self {
        MetadataLookup::Fallback {
            movie_id,
            snapshot: MetadataSnapshot::unavailable(),
            reason: FallbackReason::Unavailable(error.into()),
        }
    }

    pub fn snapshot(&self) -> &MetadataSnapshot {
        match self {
            MetadataLookup::Resolved(snapshot) => snapshot,
            MetadataLookup::Fallback { snapshot, .. } => snapshot,
        }
    }

    pub fn into_snapshot(self) -> MetadataSnapshot {
        match self {
            MetadataLookup::Resolved(snapshot) => snapshot,
            MetadataLookup::Fallback { snapshot, .. } => snapshot,
        }
    }

    /// User-facing notice for degraded lookups, `None` when resolved
    pub fn notice(&self) -> Option<String> {
        match self {
            MetadataLookup::Resolved(_) => None,
            MetadataLookup::Fallback {
                reason: FallbackReason::MissingApiKey,
                ..
            } => Some("TMDB API key is not configured".to_string()),
            MetadataLookup::Fallback {
                movie_id,
                reason: FallbackReason::Unavailable(error),
                ..
            } => Some(format!(
                "Could not fetch details for movie ID {}. Error: {}",
                movie_id, error
            )),
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Subset of the TMDB `GET /movie/{id}` response that we display
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub runtime: Option<u32>,
}
