use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, Recommendation, SearchHit},
    services::presentation::{self, LabeledRecommendation, EXPORT_FILE_NAME},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub min_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub anchor: Movie,
    pub min_score: f64,
    pub recommendations: Vec<LabeledRecommendation>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Title search. Never fails; an unmatched query yields zero-similarity hits.
pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<SearchResponse> {
    let results = state.engine.search(&params.q);
    tracing::info!(query = %params.q, results = results.len(), "Title search");
    Json(SearchResponse {
        query: params.q,
        results,
    })
}

/// Get a single movie
pub async fn get_movie(
    State(state): State<AppState>,
    movie_id: Result<Path<u32>, PathRejection>,
) -> AppResult<Json<Movie>> {
    let Path(movie_id) = movie_id?;
    lookup_movie(&state, MovieId(movie_id)).map(Json)
}

/// Recommendations for an anchor movie, filtered and labeled
pub async fn get_recommendations(
    State(state): State<AppState>,
    movie_id: Result<Path<u32>, PathRejection>,
    params: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Path(movie_id) = movie_id?;
    let Query(params) = params?;
    let min_score = state.presentation.resolve_min_score(params.min_score)?;
    let anchor = lookup_movie(&state, MovieId(movie_id))?;
    let recommendations = recommend(&state, anchor.id).await?;

    let recommendations = state.presentation.present(recommendations, min_score);
    tracing::info!(
        movie_id = %anchor.id,
        min_score,
        returned = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        anchor,
        min_score,
        recommendations,
    }))
}

/// Filtered recommendations as a downloadable CSV file
pub async fn export_recommendations(
    State(state): State<AppState>,
    movie_id: Result<Path<u32>, PathRejection>,
    params: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(movie_id) = movie_id?;
    let Query(params) = params?;
    let min_score = state.presentation.resolve_min_score(params.min_score)?;
    let anchor = lookup_movie(&state, MovieId(movie_id))?;

    let recommendations: Vec<Recommendation> = recommend(&state, anchor.id)
        .await?
        .into_iter()
        .filter(|rec| rec.score >= min_score)
        .collect();
    let body = presentation::to_csv(&recommendations)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

fn lookup_movie(state: &AppState, movie_id: MovieId) -> AppResult<Movie> {
    state
        .engine
        .movie(movie_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
}

/// Runs the scorer off the async workers; it walks the rating set.
async fn recommend(state: &AppState, movie_id: MovieId) -> AppResult<Vec<Recommendation>> {
    let engine = state.engine.clone();
    tokio::task::spawn_blocking(move || engine.recommend(movie_id))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Recommendation task failed");
            AppError::Internal(e.to_string())
        })
}
