//! Settings handlers

use crate::AppState;
use atelier_core::settings::{effective_settings, Settings};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// GET /api/v1/settings - the effective (merged, resolved) settings
pub async fn show(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let user = match Settings::load_from_root(&state.root) {
        Ok((settings, _)) => settings,
        // no settings file yet: the skeleton alone is the effective view
        Err(atelier_core::AtelierError::SettingsNotFound(_)) => {
            Settings::from_value(serde_yaml::Value::Mapping(Default::default()))
        }
        Err(e) => {
            tracing::error!("failed to load settings: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let effective = effective_settings(&state.root, &user);
    match effective.to_json() {
        Ok(json) => Ok(Json(json)),
        Err(e) => {
            tracing::error!("failed to render settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// PUT /api/v1/settings - overwrite the user settings file
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let settings = match Settings::from_json(&body) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("rejected settings update: {}", e);
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    let path = Settings::find_file(&state.root).unwrap_or_else(|| state.root.join("settings.yml"));
    if let Err(e) = settings.save(&path) {
        tracing::error!("failed to save settings: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match settings.to_json() {
        Ok(json) => Ok(Json(json)),
        Err(e) => {
            tracing::error!("failed to render settings: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
