//! Per-row parsing.
//!
//! [`parse_row`] is a pure function over its arguments (no shared state), so
//! the coordinator can call it from many pool workers without synchronization.

use std::collections::HashMap;

use crate::types::{FieldValue, ParsedRow, TRANSACTION_INDEX_KEY};

/// Parse one data row against the detected headers.
///
/// `index` is the row's 0-based position among all data rows; the reserved
/// [`TRANSACTION_INDEX_KEY`] field records it 1-based. `cells` is expected to
/// be pre-normalized to the header width (the coordinator pads/truncates), but
/// shorter rows are still handled: missing positions read as blank.
///
/// A row whose every cell trims to empty is rejected with reason
/// `"empty row"`. Otherwise each non-empty header name gets an entry:
/// [`FieldValue::Text`] for trimmed content, [`FieldValue::Absent`] for a
/// blank or missing cell. The reserved entry is inserted last, so it wins
/// over a real column named "Transaction Index".
pub fn parse_row(headers: &[String], cells: &[String], index: usize) -> ParsedRow {
    if cells.iter().all(|c| c.trim().is_empty()) {
        return ParsedRow::Rejected {
            reason: "empty row".to_string(),
        };
    }

    let ordinal = (index + 1) as u64;
    let mut fields: HashMap<String, FieldValue> = HashMap::with_capacity(headers.len() + 1);

    for (i, header) in headers.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        let value = match cells.get(i).map(|c| c.trim()) {
            Some(t) if !t.is_empty() => FieldValue::Text(t.to_string()),
            _ => FieldValue::Absent,
        };
        fields.insert(header.clone(), value);
    }

    fields.insert(TRANSACTION_INDEX_KEY.to_string(), FieldValue::Ordinal(ordinal));

    ParsedRow::Accepted { ordinal, fields }
}
