use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::MovieResponse,
    services::{
        enrichment,
        recommender::{require_param, Recommender, RESULT_LIMIT},
    },
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub genre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub movies: usize,
}

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// `GET /movies`
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<String>> {
    let model = state.current_model().await;
    Json(Recommender::new(&model).titles())
}

/// `GET /movies/genre?genre=`
pub async fn movies_by_genre(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<GenreQuery>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let genre = require_param("genre", query.genre.as_deref().unwrap_or_default())?;
    let model = state.current_model().await;
    let ranked = Recommender::new(&model).by_genre(genre, RESULT_LIMIT)?;

    tracing::info!(%request_id, genre = %genre, matches = ranked.len(), "Genre query");
    Ok(Json(enrichment::enrich(state.posters.clone(), ranked).await))
}

/// `GET /recommend?title=`
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let title = require_param("title", query.title.as_deref().unwrap_or_default())?;
    let model = state.current_model().await;
    let ranked = Recommender::new(&model).recommend(title, RESULT_LIMIT)?;

    tracing::info!(%request_id, title = %title, results = ranked.len(), "Recommendation query");
    Ok(Json(enrichment::enrich(state.posters.clone(), ranked).await))
}

/// `GET /trending`
pub async fn trending(State(state): State<AppState>) -> Json<Vec<MovieResponse>> {
    let model = state.current_model().await;
    let ranked = Recommender::new(&model).trending(RESULT_LIMIT);
    Json(enrichment::enrich(state.posters.clone(), ranked).await)
}

/// `POST /admin/reload`
pub async fn reload_model(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<ReloadResponse>> {
    let movies = state.reload().await.map_err(|e| {
        tracing::error!(%request_id, error = %e, "Model reload failed, keeping current model");
        e
    })?;
    Ok(Json(ReloadResponse { movies }))
}
