//! HTTP surface for the Search service.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use semsearch_core::{hybrid_search, semantic_search, ScoredId};

use crate::error::ApiError;
use crate::state::SearchState;

pub fn router(state: Arc<SearchState>) -> Router {
    Router::new()
        .route("/search", get(search_hybrid))
        .route("/search/semantic", get(search_semantic))
        .route("/product/:id", get(get_product))
        .route("/stats", get(stats))
        .route("/reload_index", post(reload_index))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ResultRow {
    id: i64,
    nombre: String,
    descripcion: String,
    variantes_comb: String,
    similitud: f32,
}

fn round3(x: f32) -> f32 {
    (x * 1000.0).round() / 1000.0
}

async fn build_rows(state: &SearchState, scored: Vec<ScoredId>) -> Vec<ResultRow> {
    let core = state.active();
    scored
        .into_iter()
        .filter_map(|s| {
            core.get(s.id).map(|p| ResultRow {
                id: p.id,
                nombre: p.name.clone(),
                descripcion: p.description.clone(),
                variantes_comb: p.variant_combo.clone(),
                similitud: round3(s.score),
            })
        })
        .collect()
}

async fn search_hybrid(
    State(state): State<Arc<SearchState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params
        .query
        .ok_or_else(|| ApiError(semsearch_core::Error::BadRequest("missing query".to_string())))?;
    let threshold = params.threshold.unwrap_or(state.hybrid_threshold_default);

    let core = state.active();
    let query_vector = state.embed_query(&query).await?;
    let scored = hybrid_search(&core, &query, &query_vector, threshold);
    let rows = build_rows(&state, scored).await;

    Ok(Json(json!({ "query": query, "resultados": rows })))
}

async fn search_semantic(
    State(state): State<Arc<SearchState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>, ApiError> {
    let query = params
        .query
        .ok_or_else(|| ApiError(semsearch_core::Error::BadRequest("missing query".to_string())))?;
    let threshold = params.threshold.unwrap_or(state.semantic_threshold_default);

    let core = state.active();
    let query_vector = state.embed_query(&query).await?;
    let scored = semantic_search(&core, &query_vector, threshold);
    let rows = build_rows(&state, scored).await;

    Ok(Json(json!({ "query": query, "resultados": rows })))
}

async fn get_product(
    State(state): State<Arc<SearchState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let core = state.active();
    let product = core
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError(semsearch_core::Error::NotFound(format!("product {id} not found"))))?;
    Ok(Json(serde_json::to_value(product).unwrap_or(Value::Null)))
}

async fn stats(State(state): State<Arc<SearchState>>) -> Json<Value> {
    let core = state.active();
    Json(json!({
        "total_productos": core.len(),
        "faiss_total": core.vector_index().len(),
        "dimension": core.vector_index().dimension(),
        "index_loaded": true,
        "service": "search",
    }))
}

/// Enqueues a background reload and returns immediately.
async fn reload_index(State(state): State<Arc<SearchState>>) -> Json<Value> {
    tokio::spawn(async move {
        state.reload().await;
    });
    Json(json!({ "mensaje": "reload scheduled" }))
}

async fn health(State(state): State<Arc<SearchState>>) -> Json<Value> {
    let core = state.active();
    Json(json!({
        "status": "healthy",
        "service": "search",
        "index_loaded": true,
        "total_products": core.len(),
    }))
}
