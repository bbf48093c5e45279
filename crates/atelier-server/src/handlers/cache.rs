//! Cache handlers

use crate::AppState;
use atelier_store::CacheRecord;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CacheListResponse {
    entries: Vec<CacheRecord>,
}

/// GET /api/v1/cache
pub async fn list(State(state): State<AppState>) -> Result<Json<CacheListResponse>, StatusCode> {
    match state.cache.list().await {
        Ok(entries) => Ok(Json(CacheListResponse { entries })),
        Err(e) => {
            tracing::error!("failed to list cache: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/v1/cache/:name
pub async fn forget(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.cache.forget(&name).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(atelier_store::StoreError::InvalidName(_)) => Err(StatusCode::UNPROCESSABLE_ENTITY),
        Err(e) => {
            tracing::error!("failed to forget cache entry `{}`: {}", name, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
