//! Core data model types for the ingestion pipeline.
//!
//! A workbook upload becomes a sequence of [`Record`]s, each carrying a flat
//! string-keyed field map. Field values are a small sum type so that a blank
//! or missing cell ([`FieldValue::Absent`]) stays distinguishable from real
//! content (an empty-string sentinel would conflate the two).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved field key carrying a data row's 1-based position among all data
/// rows of the sheet. It survives filtering and out-of-order delivery, so it
/// is the only durable record of original sheet position.
pub const TRANSACTION_INDEX_KEY: &str = "Transaction Index";

/// A single field value inside a [`Record`].
///
/// Serializes untagged: `Absent` → `null`, `Text` → string, `Ordinal` → number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The cell was blank after trimming, or the row was too short to cover
    /// this column.
    Absent,
    /// Trimmed, non-empty cell content.
    Text(String),
    /// 1-based data-row ordinal, used by the reserved
    /// [`TRANSACTION_INDEX_KEY`] entry.
    Ordinal(u64),
}

impl FieldValue {
    /// Borrow the text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One accepted data row, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique record id, assigned at creation.
    pub id: Uuid,
    /// Id of the upload this record came from.
    pub upload_id: String,
    /// Field map keyed by non-empty header names, plus the reserved
    /// [`TRANSACTION_INDEX_KEY`] entry.
    pub fields: HashMap<String, FieldValue>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// The record's 1-based data-row ordinal, read back from the reserved
    /// [`TRANSACTION_INDEX_KEY`] field.
    pub fn transaction_index(&self) -> Option<u64> {
        match self.fields.get(TRANSACTION_INDEX_KEY) {
            Some(FieldValue::Ordinal(n)) => Some(*n),
            _ => None,
        }
    }
}

/// Outcome of parsing one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    /// The row had at least one non-blank cell.
    Accepted {
        /// 1-based position among all data rows.
        ordinal: u64,
        /// Field map including the reserved [`TRANSACTION_INDEX_KEY`] entry.
        fields: HashMap<String, FieldValue>,
    },
    /// The row was rejected (currently only all-blank rows are).
    Rejected {
        /// Human-readable rejection reason, aggregated into
        /// [`IngestionOutcome::errors`].
        reason: String,
    },
}

/// Aggregate result of one ingestion call.
///
/// Invariant: `rows_accepted + rows_rejected` equals the number of data rows
/// in the sheet. `records` and `errors` are in worker completion order, not
/// original row order; use [`TRANSACTION_INDEX_KEY`] to recover sheet
/// positions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionOutcome {
    /// Id of the upload that produced this outcome.
    pub upload_id: String,
    /// Accepted records, in completion order.
    pub records: Vec<Record>,
    /// Number of accepted data rows.
    pub rows_accepted: usize,
    /// Number of rejected data rows.
    pub rows_rejected: usize,
    /// Rejection reasons, in arrival order.
    pub errors: Vec<String>,
}
