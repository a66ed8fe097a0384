//! Dataset error types

use crate::workbook::WorkbookError;
use thiserror::Error;

/// Errors raised while turning an input workbook into a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("Invalid group code '{code}' in row {row}: expected <PROGRAMME>-<YY>..")]
    InvalidGroupCode { row: usize, code: String },

    #[error("No curriculum sheets found (expected sheets with a course_name column)")]
    NoCurriculum,

    #[error("No rooms available for scheduling")]
    NoRooms,
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
