//! Timetable Check Route
//!
//! - POST /check - multipart `timetable` (JSON), optional `ga_input` (xlsx)
//!   and optional `trimester`

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use super::form::Form;
use crate::api::dto::CheckResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::checker::{check, trimester_from_filename};
use crate::dataset::Dataset;
use crate::export::parse_timetable_json;
use crate::pipeline::parse_trimester;

/// POST /check
///
/// The trimester comes from the form, else from a `T<n>` in the timetable
/// file name. Coverage is only checked when both it and `ga_input` are
/// present.
pub async fn check_timetable(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<CheckResponse>> {
    let form = Form::read(multipart).await?;

    let timetable_field = form
        .file("timetable")
        .ok_or_else(|| ApiError::Validation("Timetable file not provided".to_string()))?;

    let trimester = match form.text("trimester") {
        Some(raw) => Some(parse_trimester(&raw)?),
        None => timetable_field
            .file_name
            .as_deref()
            .and_then(trimester_from_filename),
    };

    let timetable = parse_timetable_json(trimester.unwrap_or(1), &timetable_field.data)
        .map_err(|e| ApiError::Validation(format!("Invalid timetable JSON: {}", e)))?;

    let input = form.file("ga_input").map(|f| f.data.clone());
    let config = Arc::clone(&state.config);

    let response = tokio::task::spawn_blocking(move || -> ApiResult<CheckResponse> {
        let dataset = match input {
            Some(data) => Some(
                Dataset::from_xlsx(&data, &config.dataset)
                    .map_err(|e| ApiError::Unprocessable(format!("Could not read GA input: {}", e)))?,
            ),
            None => None,
        };

        let report = check(&timetable, dataset.as_ref(), trimester, &config.calendar);
        Ok(CheckResponse {
            trimester,
            sessions: timetable.len(),
            clean: report.is_clean(),
            report,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Check task failed: {}", e)))??;

    Ok(Json(response))
}
