use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{MetadataSnapshot, Runtime},
    routes::AppState,
    services::Recommendations,
};

/// Characters of the overview shown per recommendation
const OVERVIEW_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub title: String,
    pub recommendations: Vec<RecommendedMovie>,
    pub notices: Vec<String>,
}

/// One display row: name, poster, overview snippet, release date, rating, runtime
#[derive(Debug, Serialize)]
pub struct RecommendedMovie {
    pub name: String,
    pub poster_url: String,
    pub overview: String,
    pub release_date: String,
    pub rating: f64,
    pub runtime: Runtime,
}

impl RecommendedMovie {
    fn new(name: String, details: MetadataSnapshot) -> Self {
        Self {
            name,
            poster_url: details.poster_url,
            overview: snippet(&details.overview, OVERVIEW_SNIPPET_CHARS),
            release_date: details.release_date,
            rating: details.rating,
            runtime: details.runtime,
        }
    }
}

impl RecommendationResponse {
    fn new(title: String, recommendations: Recommendations) -> Self {
        let Recommendations {
            names,
            details,
            notices,
        } = recommendations;

        Self {
            title,
            recommendations: names
                .into_iter()
                .zip(details)
                .map(|(name, details)| RecommendedMovie::new(name, details))
                .collect(),
            notices,
        }
    }
}

/// First `max_chars` characters, with `...` appended when cut
fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing recommendation request"
    );

    let recommendations = state.engine.recommend(&request.title).await;

    if recommendations.is_empty() {
        return Err(AppError::NotFound(
            "Could not generate recommendation. Please try again later.".to_string(),
        ));
    }

    for notice in &recommendations.notices {
        tracing::warn!(request_id = %request_id, notice = %notice, "Degraded recommendation");
    }

    Ok(Json(RecommendationResponse::new(
        request.title,
        recommendations,
    )))
}
