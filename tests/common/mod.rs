#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_xlsxwriter::Workbook;
use uuid::Uuid;

use xlsx_ingest::pipeline::{IngestOptions, Ingestor};
use xlsx_ingest::store::RecordStore;
use xlsx_ingest::types::{FieldValue, Record};

/// Build an in-memory `.xlsx` workbook from string rows.
///
/// Empty cells are simply not written, which is how real-world exports
/// produce blank rows and ragged row widths.
pub fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                ws.write_string(r as u32, c as u16, *cell).unwrap();
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

/// An ingestor over a fresh store, returning both.
pub fn ingestor_with_pool(worker_pool_size: usize) -> (Ingestor, Arc<RecordStore>) {
    let store = Arc::new(RecordStore::new());
    let ingestor = Ingestor::new(
        IngestOptions {
            worker_pool_size,
            ..Default::default()
        },
        Arc::clone(&store),
    );
    (ingestor, store)
}

/// A record with the given upload id and a single text field, for store tests.
pub fn record(upload_id: &str, name: &str) -> Record {
    let mut fields = HashMap::new();
    fields.insert("Name".to_string(), FieldValue::Text(name.to_string()));
    Record {
        id: Uuid::new_v4(),
        upload_id: upload_id.to_string(),
        fields,
        created_at: Utc::now(),
    }
}
