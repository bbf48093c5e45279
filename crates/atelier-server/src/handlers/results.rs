//! Result handlers

use crate::AppState;
use atelier_store::ResultRecord;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by visibility when present
    public: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ResultListResponse {
    entries: Vec<ResultRecord>,
}

/// GET /api/v1/results
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ResultListResponse>, StatusCode> {
    match state.results.list(query.public).await {
        Ok(entries) => Ok(Json(ResultListResponse { entries })),
        Err(e) => {
            tracing::error!("failed to list results: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/v1/results/:name
pub async fn remove(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, StatusCode> {
    match state.results.remove(&name).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(atelier_store::StoreError::InvalidName(_)) => Err(StatusCode::UNPROCESSABLE_ENTITY),
        Err(e) => {
            tracing::error!("failed to remove result `{}`: {}", name, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
