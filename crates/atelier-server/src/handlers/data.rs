//! Data registry handlers

use crate::AppState;
use atelier_store::DataRecord;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataListResponse {
    entries: Vec<DataRecord>,
}

/// GET /api/v1/data
pub async fn list(State(state): State<AppState>) -> Result<Json<DataListResponse>, StatusCode> {
    match state.data.list().await {
        Ok(entries) => Ok(Json(DataListResponse { entries })),
        Err(e) => {
            tracing::error!("failed to list data registry: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
