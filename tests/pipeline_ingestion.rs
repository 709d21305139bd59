mod common;

use std::sync::Arc;

use common::{ingestor_with_pool, workbook_bytes};
use xlsx_ingest::pipeline::{CancelToken, IngestEvent, IngestObserver, IngestOptions, Ingestor};
use xlsx_ingest::store::RecordStore;
use xlsx_ingest::types::{FieldValue, Record, TRANSACTION_INDEX_KEY};
use xlsx_ingest::IngestError;

fn field<'a>(record: &'a Record, key: &str) -> &'a FieldValue {
    record
        .fields
        .get(key)
        .unwrap_or_else(|| panic!("record has no field '{key}'"))
}

#[test]
fn accepted_plus_rejected_equals_data_rows() {
    let bytes = workbook_bytes(&[
        &["Name", "Email"],
        &["John", "john@x.com"],
        &["", ""],
        &["Jane", ""],
    ]);
    let (ingestor, store) = ingestor_with_pool(4);

    let outcome = ingestor.ingest(&bytes, "u-1", &CancelToken::new()).unwrap();

    assert_eq!(outcome.rows_accepted, 2);
    assert_eq!(outcome.rows_rejected, 1);
    assert_eq!(outcome.rows_accepted + outcome.rows_rejected, 3);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.errors, vec!["empty row".to_string()]);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn blank_cell_is_absent_marker_not_text() {
    let bytes = workbook_bytes(&[
        &["Name", "Email"],
        &["John", "john@x.com"],
        &["", ""],
        &["Jane", ""],
    ]);
    let (ingestor, _store) = ingestor_with_pool(4);

    let outcome = ingestor.ingest(&bytes, "u-1", &CancelToken::new()).unwrap();

    let jane = outcome
        .records
        .iter()
        .find(|r| field(r, "Name") == &FieldValue::Text("Jane".to_string()))
        .expect("Jane's record");
    assert_eq!(field(jane, "Email"), &FieldValue::Absent);

    let john = outcome
        .records
        .iter()
        .find(|r| field(r, "Name") == &FieldValue::Text("John".to_string()))
        .expect("John's record");
    assert_eq!(field(john, "Email"), &FieldValue::Text("john@x.com".to_string()));
}

#[test]
fn transaction_index_matches_sheet_position_regardless_of_delivery_order() {
    let mut rows: Vec<Vec<&str>> = vec![vec!["Name", "Value"]];
    let names: Vec<String> = (1..=20).map(|i| format!("row{i}")).collect();
    for name in &names {
        rows.push(vec![name.as_str(), "v"]);
    }
    let row_refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    let bytes = workbook_bytes(&row_refs);

    let (ingestor, _store) = ingestor_with_pool(8);
    let outcome = ingestor.ingest(&bytes, "u-ti", &CancelToken::new()).unwrap();

    assert_eq!(outcome.rows_accepted, 20);
    for record in &outcome.records {
        let FieldValue::Text(name) = field(record, "Name") else {
            panic!("Name should be text");
        };
        let sheet_position: u64 = name.strip_prefix("row").unwrap().parse().unwrap();
        assert_eq!(record.transaction_index(), Some(sheet_position));
    }
}

#[test]
fn preamble_workbook_parses_from_row_eight() {
    let bytes = workbook_bytes(&[
        &["Quarterly Report"],
        &["Generated 2024-01-01"],
        &["Account 1234"],
        &["Branch North"],
        &["Currency USD"],
        &["Period Q4"],
        &["Prepared by ops"],
        &["Name", "Amount"],
        &["Bob", "10"],
    ]);
    let (ingestor, store) = ingestor_with_pool(2);

    let outcome = ingestor.ingest(&bytes, "u-pre", &CancelToken::new()).unwrap();

    assert_eq!(outcome.rows_accepted, 1);
    assert_eq!(outcome.rows_rejected, 0);
    let record = &outcome.records[0];
    assert_eq!(field(record, "Name"), &FieldValue::Text("Bob".to_string()));
    assert_eq!(field(record, "Amount"), &FieldValue::Text("10".to_string()));
    assert_eq!(
        field(record, TRANSACTION_INDEX_KEY),
        &FieldValue::Ordinal(1)
    );
    assert_eq!(record.fields.len(), 3);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn header_only_workbook_is_insufficient_rows() {
    let bytes = workbook_bytes(&[&["Name", "Email"]]);
    let (ingestor, store) = ingestor_with_pool(2);

    let err = ingestor
        .ingest(&bytes, "u-short", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, IngestError::InsufficientRows));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn garbage_bytes_fail_to_open() {
    let (ingestor, _store) = ingestor_with_pool(2);
    let err = ingestor
        .ingest(b"definitely not a workbook", "u-bad", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, IngestError::Open(_)));
}

#[test]
fn cell_free_workbook_is_no_data() {
    let bytes = workbook_bytes(&[]);
    let (ingestor, _store) = ingestor_with_pool(2);
    let err = ingestor
        .ingest(&bytes, "u-empty", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, IngestError::NoData));
}

#[test]
fn whitespace_only_headers_are_invalid() {
    let bytes = workbook_bytes(&[&[" ", "  "], &["a", "b"]]);
    let (ingestor, _store) = ingestor_with_pool(2);
    let err = ingestor
        .ingest(&bytes, "u-blank-hdr", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidHeaders));
}

#[test]
fn content_beyond_header_columns_does_not_rescue_a_row() {
    // Row 1 only has content in a column with no header above it; rows are
    // normalized to header width before the empty-row check.
    let bytes = workbook_bytes(&[&["Name"], &["", "stray"]]);
    let (ingestor, _store) = ingestor_with_pool(2);

    let outcome = ingestor
        .ingest(&bytes, "u-stray", &CancelToken::new())
        .unwrap();
    assert_eq!(outcome.rows_accepted, 0);
    assert_eq!(outcome.rows_rejected, 1);
    assert_eq!(outcome.errors, vec!["empty row".to_string()]);
}

#[test]
fn records_accumulate_across_uploads() {
    let bytes = workbook_bytes(&[&["Name"], &["a"], &["b"]]);
    let (ingestor, store) = ingestor_with_pool(2);

    ingestor.ingest(&bytes, "u-first", &CancelToken::new()).unwrap();
    ingestor.ingest(&bytes, "u-second", &CancelToken::new()).unwrap();

    assert_eq!(store.count().unwrap(), 4);
    assert_eq!(store.records_for_upload("u-first").unwrap().len(), 2);
    assert_eq!(store.records_for_upload("u-second").unwrap().len(), 2);
}

#[test]
fn pre_cancelled_token_fails_fast_and_stores_nothing() {
    let bytes = workbook_bytes(&[&["Name"], &["a"], &["b"]]);
    let (ingestor, store) = ingestor_with_pool(2);

    let cancel = CancelToken::new();
    cancel.cancel();

    let err = ingestor.ingest(&bytes, "u-cancel", &cancel).unwrap_err();
    assert!(matches!(err, IngestError::Cancelled));
    assert_eq!(store.count().unwrap(), 0);
}

struct CancelOnFirstRow {
    token: CancelToken,
}

impl IngestObserver for CancelOnFirstRow {
    fn on_event(&self, event: &IngestEvent) {
        if matches!(event, IngestEvent::RowParsed { .. }) {
            self.token.cancel();
        }
    }
}

#[test]
fn cancelling_mid_parse_yields_cancelled_and_stores_nothing() {
    let bytes = workbook_bytes(&[&["Name"], &["a"], &["b"], &["c"], &["d"]]);

    let cancel = CancelToken::new();
    let store = Arc::new(RecordStore::new());
    // One worker: the token fires after the first parsed row, while later
    // jobs are still queued and results are still being awaited.
    let ingestor = Ingestor::new(
        IngestOptions {
            worker_pool_size: 1,
            observer: Some(Arc::new(CancelOnFirstRow {
                token: cancel.clone(),
            })),
        },
        Arc::clone(&store),
    );

    let err = ingestor.ingest(&bytes, "u-mid", &cancel).unwrap_err();
    assert!(matches!(err, IngestError::Cancelled));
    assert_eq!(store.count().unwrap(), 0);
}
