//! API Error Types
//!
//! Error types for the HTTP layer and their mapping to status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::pipeline::PipelineError;
use crate::solver::SolverError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed request fields
    #[error("{0}")]
    Validation(String),

    /// Well-formed upload the scheduler cannot work with
    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidTrimester(_) => ApiError::Validation(err.to_string()),
            PipelineError::Dataset(DatasetError::Workbook(e)) => {
                ApiError::Unprocessable(format!("Could not read the uploaded workbook: {}", e))
            }
            PipelineError::Dataset(e) => ApiError::Unprocessable(e.to_string()),
            PipelineError::Solver(e @ (SolverError::NoSessions(_) | SolverError::NoRooms)) => {
                ApiError::Unprocessable(e.to_string())
            }
            PipelineError::Solver(e) => ApiError::Internal(e.to_string()),
            PipelineError::Export(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE_INPUT"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::WorkbookError;

    #[test]
    fn test_pipeline_error_mapping() {
        let invalid: ApiError = PipelineError::InvalidTrimester("9".to_string()).into();
        assert_eq!(invalid.status_and_code().0, StatusCode::BAD_REQUEST);

        let unreadable: ApiError =
            PipelineError::Dataset(DatasetError::Workbook(WorkbookError::MissingPart("xl/workbook.xml".to_string())))
                .into();
        assert_eq!(unreadable.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let oversized: ApiError = PipelineError::Dataset(DatasetError::Workbook(WorkbookError::InvalidCell {
            reference: "ZZZZZZZ1".to_string(),
            message: "column out of range".to_string(),
        }))
        .into();
        assert_eq!(oversized.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let empty: ApiError = PipelineError::Solver(SolverError::NoSessions(2)).into();
        assert_eq!(empty.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let broken: ApiError = PipelineError::Solver(SolverError::InvalidConfig("x".to_string())).into();
        assert_eq!(broken.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_message_is_bare() {
        let err = ApiError::Validation("File or trimester not provided".to_string());
        assert_eq!(err.to_string(), "File or trimester not provided");
    }
}
