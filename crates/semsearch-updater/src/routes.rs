//! HTTP surface for the Updater service, grounded on the axum router/handler
//! shape in `massive_graph`'s `api::server`/`handlers`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::UpdaterState;

pub fn router(state: Arc<UpdaterState>) -> Router {
    Router::new()
        .route("/update/add/:id", post(add_product))
        .route("/update/modify/:id", post(modify_product))
        .route("/update/delete/:id", post(delete_product))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn add_product(
    State(state): State<Arc<UpdaterState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.add(id).await?;
    Ok(Json(json!({ "mensaje": format!("product {id} added") })))
}

async fn modify_product(
    State(state): State<Arc<UpdaterState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.modify(id).await?;
    Ok(Json(json!({ "mensaje": format!("product {id} modified") })))
}

async fn delete_product(
    State(state): State<Arc<UpdaterState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.delete(id).await?;
    Ok(Json(json!({ "mensaje": format!("product {id} deleted") })))
}

async fn stats(State(state): State<Arc<UpdaterState>>) -> Json<Value> {
    Json(state.stats().await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "updater" }))
}
