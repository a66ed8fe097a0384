//! Timetabler HTTP API
//!
//! HTTP layer built with Axum.
//!
//! # Endpoints
//!
//! ## Scheduling
//! - `POST /generate_schedule` - Generate a timetable from an uploaded workbook
//! - `GET /download_json` - Latest JSON timetable
//! - `GET /download_excel` - Latest Excel timetable
//! - `GET /download_csv` - Latest CSV timetable
//! - `POST /check` - Audit a timetable for conflicts and curriculum coverage
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Generation progress stream
//!
//! Any other path is served from `server.static_dir` when configured.
//!
//! # Example
//!
//! ```rust,ignore
//! use timetabler::api::{serve, AppState};
//! use timetabler::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(Config::load_default());
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::websocket::websocket_handler;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_upload_mb * 1024 * 1024;
    let static_dir = state.config.server.static_dir.clone();

    let upload_routes = Router::new()
        .route("/generate_schedule", post(routes::generate::generate_schedule))
        .route("/check", post(routes::check::check_timetable))
        .layer(DefaultBodyLimit::max(max_body));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let mut router = Router::new()
        .merge(upload_routes)
        .route("/download_json", get(routes::download::download_json))
        .route("/download_excel", get(routes::download::download_excel))
        .route("/download_csv", get(routes::download::download_csv))
        .route("/ws", get(websocket_handler))
        .nest("/health", health_routes);

    if let Some(dir) = static_dir {
        let index = Path::new(&dir).join("index.html");
        router = router.fallback_service(ServeDir::new(&dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the server on `server.host:server.port`
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.server.addr();
    let output_dir = state.output_dir().to_path_buf();
    tokio::fs::create_dir_all(&output_dir).await?;

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, output_dir = %output_dir.display(), "Timetabler listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Timetabler shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorResponse;
    use crate::config::Config;
    use crate::dataset::fixtures::sample_workbook;
    use crate::export::{fixtures::sample_timetable, timetable_json};
    use crate::workbook::write_workbook;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "timetabler-test-boundary";

    fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.output.dir = dir.path().to_string_lossy().into_owned();
        config.solver.population_size = 10;
        config.solver.generations = 10;

        (build_router(AppState::new(config)), dir)
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part]) -> Body {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, content) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                            name, file_name
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(content);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        Body::from(body)
    }

    fn post_form(uri: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(body)
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn error_message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        error.error.message
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get_request("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get_request("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["websocket_connections"], 0);
    }

    #[tokio::test]
    async fn test_generate_without_file() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_form("/generate_schedule", multipart(&[Part::Text("trimester", "1")])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "File or trimester not provided");
    }

    #[tokio::test]
    async fn test_generate_without_trimester() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_form(
                "/generate_schedule",
                multipart(&[Part::File("file", "input.xlsx", b"PK")]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_bad_trimester() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_form(
                "/generate_schedule",
                multipart(&[Part::File("file", "input.xlsx", b"PK"), Part::Text("trimester", "5")]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_unreadable_workbook() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_form(
                "/generate_schedule",
                multipart(&[
                    Part::File("file", "input.xlsx", b"definitely not a zip"),
                    Part::Text("trimester", "1"),
                ]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_generate_then_download() {
        let (app, dir) = create_test_app();
        let workbook = write_workbook(&sample_workbook()).unwrap();

        let response = app
            .clone()
            .oneshot(post_form(
                "/generate_schedule",
                multipart(&[Part::File("file", "input.xlsx", &workbook), Part::Text("trimester", "1")]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let metrics = json_body(response).await;
        assert_eq!(metrics["conflicts"], 0);
        assert_eq!(metrics["sessions"], 7);
        assert!(metrics["fitnessScore"].as_f64().unwrap() > 0.0);
        assert_eq!(metrics["downloads"]["excel"], "/download_excel?trimester=1");
        assert!(dir.path().join("timetable_T1.xlsx").exists());

        let response = app.clone().oneshot(get_request("/download_json?trimester=1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"timetable_T1.json\""));

        let timetable = json_body(response).await;
        assert!(timetable.get("IT-2401").is_some());

        // trimester defaults to 1
        let response = app.oneshot(get_request("/download_csv")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_download_missing_file() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get_request("/download_excel?trimester=2")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(response).await, "Excel file not found");
    }

    #[tokio::test]
    async fn test_download_bad_trimester() {
        let (app, _dir) = create_test_app();
        let response = app.oneshot(get_request("/download_json?trimester=abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_timetable() {
        let (app, _dir) = create_test_app();
        let timetable = timetable_json(&sample_timetable()).unwrap();
        let workbook = write_workbook(&sample_workbook()).unwrap();

        let response = app
            .oneshot(post_form(
                "/check",
                multipart(&[
                    Part::File("timetable", "timetable_T1.json", timetable.as_bytes()),
                    Part::File("ga_input", "input.xlsx", &workbook),
                ]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let report = json_body(response).await;
        assert_eq!(report["trimester"], 1);
        assert_eq!(report["sessions"], 4);
        assert_eq!(report["coverage_checked"], true);
        assert_eq!(report["conflicts"].as_array().unwrap().len(), 0);
        assert_eq!(report["violations"].as_array().unwrap().len(), 2);
        assert_eq!(report["clean"], false);
    }

    #[tokio::test]
    async fn test_check_rejects_bad_json() {
        let (app, _dir) = create_test_app();
        let response = app
            .oneshot(post_form(
                "/check",
                multipart(&[Part::File("timetable", "t.json", b"[1, 2")]),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
