//! Atelier - Local GUI Server
//!
//! Serves a JSON API over the project's settings and metadata store plus
//! the static assets of the settings GUI. CORS is wide open: the server
//! binds to loopback and exists only for local use.

mod handlers;

use anyhow::{Context, Result};
use atelier_store::{CacheStore, Database, DataRegistry, ProjectKey, ResultStore};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Project root directory
    pub root: PathBuf,
    /// Port on 127.0.0.1
    pub port: u16,
    /// Directory of prebuilt GUI assets; `<root>/gui` when unset
    pub assets_dir: Option<PathBuf>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub cache: CacheStore,
    pub results: ResultStore,
    pub data: DataRegistry,
}

impl AppState {
    /// Open the project's store and build the shared state.
    pub async fn open(root: &Path) -> Result<Self> {
        let db = Database::open(root)
            .await
            .context("failed to open metadata database")?;
        let key = Arc::new(
            ProjectKey::load_or_create(root).context("failed to load project key")?,
        );
        Ok(Self {
            root: root.to_path_buf(),
            cache: CacheStore::new(db.clone(), root),
            results: ResultStore::new(db.clone(), root, key),
            data: DataRegistry::new(db, root),
        })
    }
}

/// Build the full router: API, health check, and static GUI assets.
pub fn build_router(state: AppState, assets_dir: &Path) -> Router {
    let index_path = assets_dir.join("index.html");

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        // SPA: unknown paths fall back to index.html
        .fallback_service(ServeDir::new(assets_dir).fallback(ServeFile::new(index_path)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(handlers::settings::show).put(handlers::settings::update),
        )
        .route("/cache", get(handlers::cache::list))
        .route("/cache/:name", axum::routing::delete(handlers::cache::forget))
        .route("/results", get(handlers::results::list))
        .route(
            "/results/:name",
            axum::routing::delete(handlers::results::remove),
        )
        .route("/data", get(handlers::data::list))
}

/// Run the server until the task is cancelled.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::open(&config.root).await?;
    let assets_dir = config
        .assets_dir
        .clone()
        .unwrap_or_else(|| config.root.join("gui"));
    let app = build_router(state, &assets_dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("settings GUI listening on http://{}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_store::SaveOptions;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).await.unwrap();
        let app = build_router(state, &dir.path().join("gui"));
        (dir, app)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responds() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn settings_round_trip_through_api() {
        let (dir, app) = test_app().await;

        let body = json!({"meta": {"version": 2}, "defaults": {"seed": 99}});
        let response = app
            .clone()
            .oneshot(
                Request::put("/api/v1/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(dir.path().join("settings.yml").exists());

        let response = app
            .oneshot(Request::get("/api/v1/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let settings = body_json(response).await;
        assert_eq!(settings["defaults"]["seed"], json!(99));
        // skeleton keys are merged in
        assert!(settings["directories"].is_object());
    }

    #[tokio::test]
    async fn settings_reject_non_object_body() {
        let (_dir, app) = test_app().await;
        let response = app
            .oneshot(
                Request::put("/api/v1/settings")
                    .header("content-type", "application/json")
                    .body(Body::from("[1,2,3]"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn cache_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).await.unwrap();
        state.cache.put("fit", &json!(1), None).await.unwrap();
        let app = build_router(state, &dir.path().join("gui"));

        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/cache").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed["entries"][0]["name"], json!("fit"));

        let response = app
            .clone()
            .oneshot(
                Request::delete("/api/v1/cache/fit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::delete("/api/v1/cache/fit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn results_are_listed_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path()).await.unwrap();
        state
            .results
            .save(
                "summary",
                &json!({"n": 10}),
                &SaveOptions {
                    public: true,
                    kind: "table".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let app = build_router(state, &dir.path().join("gui"));

        let response = app
            .oneshot(Request::get("/api/v1/results").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = body_json(response).await;
        assert_eq!(listed["entries"][0]["name"], json!("summary"));
        assert_eq!(listed["entries"][0]["public"], json!(true));
        assert_eq!(listed["entries"][0]["type"], json!("table"));
    }
}
