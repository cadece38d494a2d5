//! Integration tests for the search endpoint.
//!
//! The handler is exercised through the real router with a stub embedder and
//! an in-memory vector index, so no provider credentials are needed.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use common::{card, test_config, test_pipeline, StubEmbedder};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use toolscout::{ready_handler, search_handler, AppState, MemoryIndex};
use tower::ServiceExt;

fn create_test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", post(search_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

/// Helper to make JSON POST request.
async fn json_post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));

    (status, body)
}

/// State over a stub embedder and a shared in-memory index, with the given
/// cards already indexed and the ready flag set.
async fn ready_state(embedder: StubEmbedder, cards: &[toolscout::ToolCard]) -> Arc<AppState> {
    let spec_path = PathBuf::from("/nonexistent/openapi.json");
    let index = Arc::new(MemoryIndex::new());
    let pipeline = test_pipeline(embedder, index, spec_path.clone());

    pipeline.index_tool_cards(cards).await.unwrap();

    let state = AppState::from_parts(pipeline, Arc::new(test_config(spec_path)));
    state.bootstrap().await.unwrap();
    Arc::new(state)
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_search_empty_query_returns_400() {
    let state = ready_state(StubEmbedder::new(2), &[]).await;
    let app = create_test_app(state);

    let (status, response) = json_post(app, "/search", json!({ "query": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .unwrap_or("")
        .to_lowercase()
        .contains("empty"));
}

#[tokio::test]
async fn test_search_zero_top_k_returns_400() {
    let state = ready_state(StubEmbedder::new(2), &[]).await;
    let app = create_test_app(state);

    let (status, response) =
        json_post(app, "/search", json!({ "query": "test", "top_k": 0 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .unwrap_or("")
        .to_lowercase()
        .contains("top_k"));
}

#[tokio::test]
async fn test_search_before_bootstrap_returns_503() {
    let spec_path = PathBuf::from("/nonexistent/openapi.json");
    let index = Arc::new(MemoryIndex::new());
    let pipeline = test_pipeline(StubEmbedder::new(2), index, spec_path.clone());
    let state = Arc::new(AppState::from_parts(
        pipeline,
        Arc::new(test_config(spec_path)),
    ));
    let app = create_test_app(state);

    let (status, response) = json_post(app, "/search", json!({ "query": "anything" })).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response["error"]
        .as_str()
        .unwrap_or("")
        .contains("unavailable"));
}

// ============================================================================
// Ranking and Response Shape Tests
// ============================================================================

#[tokio::test]
async fn test_search_returns_results_in_adjusted_score_order() {
    let charges = card("GetCharges", "GET", "/v1/charges");
    let sources = card("GetSources", "GET", "/v1/customers/{id}/sources/{source}");

    let embedder = StubEmbedder::new(2)
        .with(&charges.embedding_text(), vec![1.0, 0.0])
        .with(&sources.embedding_text(), vec![0.8, 0.6])
        .with("list recent charges", vec![1.0, 0.0]);

    let state = ready_state(embedder, &[charges, sources]).await;
    let app = create_test_app(state);

    let (status, response) =
        json_post(app, "/search", json!({ "query": "list recent charges" })).await;

    assert_eq!(status, StatusCode::OK);
    let results = response["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["name"], "GetCharges");
    assert_eq!(results[0]["method"], "GET");
    assert_eq!(results[0]["path"], "/v1/charges");
    assert!(results[0]["params"].is_object());
    assert!(results[0]["score"].is_number());

    let first = results[0]["adjusted_score"].as_f64().unwrap();
    let second = results[1]["adjusted_score"].as_f64().unwrap();
    assert!(first >= second);
}

#[tokio::test]
async fn test_search_with_no_matches_returns_empty_results() {
    let embedder = StubEmbedder::new(2).with("deploy a kubernetes cluster", vec![1.0, 0.0]);
    let state = ready_state(embedder, &[]).await;
    let app = create_test_app(state);

    let (status, response) = json_post(
        app,
        "/search",
        json!({ "query": "deploy a kubernetes cluster" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_honors_top_k() {
    let cards: Vec<_> = (0..4)
        .map(|i| card(&format!("Tool{i}"), "GET", &format!("/v1/tool{i}")))
        .collect();

    let mut embedder = StubEmbedder::new(2).with("a tool", vec![1.0, 0.0]);
    for (i, c) in cards.iter().enumerate() {
        embedder = embedder.with(&c.embedding_text(), vec![1.0, i as f32 * 0.5]);
    }

    let state = ready_state(embedder, &cards).await;
    let app = create_test_app(state);

    let (status, response) =
        json_post(app, "/search", json!({ "query": "a tool", "top_k": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["results"].as_array().unwrap().len(), 2);
}

// ============================================================================
// Readiness Tests
// ============================================================================

#[tokio::test]
async fn test_ready_endpoint_tracks_bootstrap() {
    let spec_path = PathBuf::from("/nonexistent/openapi.json");
    let index = Arc::new(MemoryIndex::new());
    let pipeline = test_pipeline(StubEmbedder::new(2), index, spec_path.clone());
    let state = Arc::new(AppState::from_parts(
        pipeline,
        Arc::new(test_config(spec_path)),
    ));

    let req = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(Arc::clone(&state)).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    state.bootstrap().await.unwrap();

    let req = Request::builder()
        .uri("/ready")
        .body(Body::empty())
        .unwrap();
    let response = create_test_app(state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
