use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{routes::AppState, services::title_search};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitleListResponse {
    pub titles: Vec<String>,
}

/// Handler listing the catalog titles a user can pick from
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleQuery>,
) -> Json<TitleListResponse> {
    let titles = title_search::search_titles(state.engine.store(), params.q.as_deref());
    Json(TitleListResponse { titles })
}
