//! Header-row detection.
//!
//! The whole heuristic lives behind [`detect`] so it can later be replaced by
//! something more general (e.g. scanning for the first row whose non-empty
//! cell count clears a threshold) without touching the rest of the pipeline.

use crate::error::{IngestError, IngestResult};

/// Row index used as the header when the preamble heuristic fires.
const PREAMBLE_HEADER_ROW: usize = 7;

/// The preamble heuristic only fires when the sheet has more rows than this.
const PREAMBLE_MIN_ROWS: usize = 8;

/// Where the header row sits and where data begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    /// Index of the header row in the sheet's row matrix.
    pub header_row: usize,
    /// Index of the first data row.
    pub data_start: usize,
    /// Trimmed header cells. Empty entries are retained positionally so
    /// column alignment is preserved; they are skipped when building a
    /// record's field map.
    pub headers: Vec<String>,
}

/// Locate the header row and the start of data in a sheet's row matrix.
///
/// Default layout is header at row 0, data from row 1. If row 0 has exactly
/// one column and the sheet has more than 8 rows, rows 0–6 are treated as a
/// single-column title/metadata preamble: the header is row 7 and data starts
/// at row 8. The rule is fixed and not schema-aware; it can misfire on
/// legitimate one-column sheets taller than 8 rows.
pub fn detect(rows: &[Vec<String>]) -> IngestResult<HeaderLayout> {
    if rows.is_empty() {
        return Err(IngestError::NoData);
    }
    if rows.len() < 2 {
        return Err(IngestError::InsufficientRows);
    }

    let (header_row, data_start) = if rows[0].len() == 1 && rows.len() > PREAMBLE_MIN_ROWS {
        (PREAMBLE_HEADER_ROW, PREAMBLE_HEADER_ROW + 1)
    } else {
        (0, 1)
    };

    let raw_header = rows.get(header_row).ok_or(IngestError::InsufficientRows)?;
    if raw_header.is_empty() {
        return Err(IngestError::NoHeaders);
    }

    let headers: Vec<String> = raw_header.iter().map(|c| c.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::InvalidHeaders);
    }

    Ok(HeaderLayout {
        header_row,
        data_start,
        headers,
    })
}
