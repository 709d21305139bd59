use thiserror::Error;

use crate::store::StoreError;

/// Convenience result type for pipeline operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Error type returned by the ingestion pipeline.
///
/// One variant per failure kind; the external transport layer classifies these
/// into user-facing responses. Per-row failures ("empty row") are never errors;
/// they are counted and reported inside [`crate::types::IngestionOutcome`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// The uploaded bytes are not a well-formed workbook.
    #[error("failed to open workbook: {0}")]
    Open(#[from] calamine::XlsxError),

    /// The workbook contains zero sheets.
    #[error("workbook has no sheets")]
    NoSheets,

    /// Row extraction failed for the selected sheet.
    #[error("failed to read rows from sheet '{sheet}': {source}")]
    SheetRead {
        sheet: String,
        source: calamine::XlsxError,
    },

    /// The sheet contains zero rows.
    #[error("workbook has no data")]
    NoData,

    /// Fewer than two rows, or the computed header row is out of bounds.
    /// A workbook needs at least a header row and one data row.
    #[error("workbook must contain a header row and at least one data row")]
    InsufficientRows,

    /// The header row has zero cells.
    #[error("workbook has no headers")]
    NoHeaders,

    /// Every header cell is empty after trimming.
    #[error("workbook has no valid headers")]
    InvalidHeaders,

    /// The cancellation token fired while jobs were being submitted or results
    /// were still being awaited. No partial outcome is ever surfaced.
    #[error("ingestion cancelled")]
    Cancelled,

    /// Appending accepted records to the store failed.
    #[error("failed to store records: {0}")]
    Storage(#[from] StoreError),
}
