//! Download Routes
//!
//! - GET /download_json?trimester=n
//! - GET /download_excel?trimester=n
//! - GET /download_csv?trimester=n
//!
//! `trimester` defaults to 1.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::DownloadParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::export::OutputKind;
use crate::pipeline::parse_trimester;

pub async fn download_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Response> {
    serve_output(&state, &params, OutputKind::Json).await
}

pub async fn download_excel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Response> {
    serve_output(&state, &params, OutputKind::Excel).await
}

pub async fn download_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Response> {
    serve_output(&state, &params, OutputKind::Csv).await
}

async fn serve_output(state: &AppState, params: &DownloadParams, kind: OutputKind) -> ApiResult<Response> {
    let trimester = match params.trimester.as_deref() {
        Some(raw) => parse_trimester(raw)?,
        None => 1,
    };

    let path = state.output_path(trimester, kind).await;
    let body = match tokio::fs::read(&path).await {
        Ok(body) => body,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("{} file not found", kind.label())));
        }
        Err(e) => return Err(e.into()),
    };

    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or("timetable")
        .to_string();

    tracing::debug!(trimester, path = %path.display(), bytes = body.len(), "Serving download");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        Body::from(body),
    )
        .into_response())
}

/// `attachment` header with a plain and an RFC 5987 encoded filename
pub fn content_disposition(filename: &str) -> String {
    let plain: String = filename
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        plain,
        urlencoding::encode(filename)
    )
}
