//! Tool search handler.
//!
//! Thin HTTP surface over the pipeline: validate the request, run
//! query → embed → search → re-rank, and map scored candidates back to the
//! tool-card shape callers expect. Zero matches is a 200 with an empty list;
//! provider failures surface as a generic retrieval-unavailable response.

use crate::error::{AppError, Result};
use crate::ingestion::ParamMap;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// The natural language query to match against tool cards.
    pub query: String,
    /// Number of candidates to retrieve; defaults to the configured top-k.
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub method: String,
    pub path: String,
    pub description: String,
    pub params: ParamMap,
    /// Raw similarity from the vector store.
    pub score: f64,
    /// Similarity blended with the structural prior (ordering key).
    pub adjusted_score: f64,
}

/// POST /search - Rank the indexed tool cards against a free-text query.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start_time = std::time::Instant::now();

    if request.query.is_empty() {
        return Err(AppError::ValidationError(
            "Query cannot be empty".to_string(),
        ));
    }
    if request.top_k == Some(0) {
        return Err(AppError::ValidationError(
            "top_k must be at least 1".to_string(),
        ));
    }
    if !state.is_ready() {
        return Err(AppError::IndexUnavailable(
            "startup indexing has not finished".to_string(),
        ));
    }

    let candidates = state
        .pipeline
        .retrieve_tools(&request.query, request.top_k)
        .await?;

    let results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|candidate| SearchResult {
            name: candidate.card.name,
            method: candidate.card.method,
            path: candidate.card.path,
            description: candidate.card.description,
            params: candidate.card.params,
            score: candidate.similarity,
            adjusted_score: candidate.adjusted,
        })
        .collect();

    let elapsed = start_time.elapsed();
    tracing::info!(
        query = %request.query,
        results = results.len(),
        total_ms = elapsed.as_millis() as u64,
        "Search completed"
    );

    metrics::counter!("search_requests_total").increment(1);
    metrics::histogram!("search_latency_ms").record(elapsed.as_millis() as f64);

    Ok(Json(SearchResponse { results }))
}
