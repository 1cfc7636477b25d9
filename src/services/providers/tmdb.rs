/// TMDB (The Movie Database) metadata provider
///
/// API Flow:
/// 1. Details: /movie/{movie_id} → poster path, overview, release date, rating, runtime
///
/// The key is sent both as the `api_key` query parameter and as a bearer token,
/// so either v3 keys or v4 read tokens work.
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::{
    error::{AppError, AppResult},
    models::{MetadataLookup, MetadataSnapshot, Runtime, TmdbMovieDetails, NO_IMAGE_POSTER},
    services::{http::RetryingClient, providers::MetadataProvider},
};

const POSTER_SIZE: &str = "w500";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: RetryingClient,
    api_key: Option<String>,
    api_url: String,
    image_url: String,
}

impl TmdbProvider {
    pub fn new(
        http_client: RetryingClient,
        api_key: Option<String>,
        api_url: String,
        image_url: String,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_details(&self, api_key: &str, movie_id: u64) -> AppResult<TmdbMovieDetails> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| AppError::Configuration(format!("Invalid TMDB API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let response = self
            .http_client
            .get(&url, &[("api_key", api_key)], headers)
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(movie_id, status = %status, body = %body, "TMDB API error body");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}",
                status
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(movie_id, response = %response_text, "Raw TMDB API response");

        serde_json::from_str(&response_text).map_err(|e| {
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    /// Convert a TMDB details payload to a fully populated snapshot
    fn convert_api_response(&self, details: TmdbMovieDetails) -> MetadataSnapshot {
        let poster_url = match details.poster_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => format!(
                "{}/{}/{}",
                self.image_url,
                POSTER_SIZE,
                path.trim_start_matches('/')
            ),
            _ => NO_IMAGE_POSTER.to_string(),
        };

        MetadataSnapshot {
            poster_url,
            overview: details
                .overview
                .unwrap_or_else(|| "No overview available".to_string()),
            release_date: details
                .release_date
                .unwrap_or_else(|| "Release date unknown".to_string()),
            rating: round_rating(details.vote_average.unwrap_or(0.0)),
            runtime: details.runtime.map_or(Runtime::Unknown, Runtime::Minutes),
        }
    }
}

/// Clamp to the 0–10 scale and round to one decimal place
fn round_rating(vote_average: f64) -> f64 {
    if !vote_average.is_finite() {
        return 0.0;
    }
    (vote_average.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn lookup(&self, movie_id: u64) -> MetadataLookup {
        let Some(api_key) = self.api_key.as_deref() else {
            return MetadataLookup::missing_api_key(movie_id);
        };

        match self.fetch_details(api_key, movie_id).await {
            Ok(details) => {
                let snapshot = self.convert_api_response(details);
                tracing::info!(
                    movie_id,
                    rating = snapshot.rating,
                    provider = self.name(),
                    "Metadata fetched"
                );
                MetadataLookup::Resolved(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    movie_id,
                    error = %e,
                    provider = self.name(),
                    "Could not fetch movie details, using fallback"
                );
                MetadataLookup::unavailable(movie_id, e.to_string())
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::RetryPolicy;
    use std::time::Duration;

    fn create_test_provider(api_key: Option<&str>) -> TmdbProvider {
        TmdbProvider::new(
            RetryingClient::new(Duration::from_secs(1), RetryPolicy::default()).unwrap(),
            api_key.map(str::to_string),
            "http://test.local/3/".to_string(),
            "https://image.test.local/t/p/".to_string(),
        )
    }

    #[test]
    fn test_convert_api_response_full() {
        let provider = create_test_provider(Some("test_key"));
        let details = TmdbMovieDetails {
            poster_path: Some("/kyeqWdyUXW608qlYkRqosgbbJyK.jpg".to_string()),
            overview: Some("In the 22nd century, a paraplegic Marine...".to_string()),
            release_date: Some("2009-12-10".to_string()),
            vote_average: Some(7.573),
            runtime: Some(162),
        };

        let snapshot = provider.convert_api_response(details);
        assert_eq!(
            snapshot.poster_url,
            "https://image.test.local/t/p/w500/kyeqWdyUXW608qlYkRqosgbbJyK.jpg"
        );
        assert_eq!(snapshot.release_date, "2009-12-10");
        assert_eq!(snapshot.rating, 7.6);
        assert_eq!(snapshot.runtime, Runtime::Minutes(162));
    }

    #[test]
    fn test_convert_api_response_empty_payload() {
        let provider = create_test_provider(Some("test_key"));

        let snapshot = provider.convert_api_response(TmdbMovieDetails::default());
        assert_eq!(snapshot.poster_url, NO_IMAGE_POSTER);
        assert_eq!(snapshot.overview, "No overview available");
        assert_eq!(snapshot.release_date, "Release date unknown");
        assert_eq!(snapshot.rating, 0.0);
        assert_eq!(snapshot.runtime, Runtime::Unknown);
    }

    #[test]
    fn test_convert_api_response_blank_poster_path() {
        let provider = create_test_provider(Some("test_key"));
        let details = TmdbMovieDetails {
            poster_path: Some("".to_string()),
            ..TmdbMovieDetails::default()
        };

        let snapshot = provider.convert_api_response(details);
        assert_eq!(snapshot.poster_url, NO_IMAGE_POSTER);
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(7.666), 7.7);
        assert_eq!(round_rating(8.04), 8.0);
        assert_eq!(round_rating(10.0), 10.0);
        assert_eq!(round_rating(12.3), 10.0);
        assert_eq!(round_rating(-1.0), 0.0);
        assert_eq!(round_rating(f64::NAN), 0.0);
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let provider = create_test_provider(Some("  "));
        assert!(provider.api_key.is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_returns_fallback() {
        let provider = create_test_provider(None);

        let lookup = provider.lookup(42).await;
        assert_eq!(lookup, MetadataLookup::missing_api_key(42));
        assert_eq!(provider.fetch(42).await, MetadataSnapshot::missing_api_key());
    }
}
