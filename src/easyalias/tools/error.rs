use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that stop a whole run, as opposed to the
/// per-request outcomes reported by the batch assigner.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the JSON report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook cannot be mapped onto the in-memory model.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a cell address or range is not valid A1 notation.
    #[error("invalid cell reference '{0}'")]
    InvalidCellReference(String),

    /// Raised when a selection covers more cells than one run processes.
    #[error("selection covers {cells} cells, more than the limit of {limit}")]
    SelectionTooLarge { cells: u64, limit: u64 },

    /// Raised when the requested worksheet does not exist.
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// Raised after a run in which at least one alias could not be assigned.
    #[error("{failed} of {total} alias assignments failed")]
    AssignmentsFailed { failed: usize, total: usize },
}
