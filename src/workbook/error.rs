//! Workbook error types

use thiserror::Error;

/// Errors raised while reading or writing `.xlsx` workbooks
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The container is not a readable ZIP archive
    #[error("Invalid workbook archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O on an archive entry failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A SpreadsheetML part is malformed
    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    /// A required part is absent from the archive
    #[error("Missing workbook part: {0}")]
    MissingPart(String),

    /// A cell carries an unusable reference or value
    #[error("Invalid cell {reference}: {message}")]
    InvalidCell { reference: String, message: String },
}

impl WorkbookError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        WorkbookError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for workbook operations
pub type WorkbookResult<T> = Result<T, WorkbookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkbookError::MissingPart("xl/workbook.xml".to_string());
        assert_eq!(err.to_string(), "Missing workbook part: xl/workbook.xml");

        let err = WorkbookError::xml("xl/sharedStrings.xml", "unexpected end");
        assert_eq!(
            err.to_string(),
            "Malformed XML in xl/sharedStrings.xml: unexpected end"
        );
    }
}
