//! `xlsx-ingest` turns spreadsheet-style tabular uploads into queryable
//! records: it opens an `.xlsx` workbook image, locates the header row,
//! parses and validates every data row on a fixed-size worker pool, and
//! appends the accepted records to an in-memory [`store::RecordStore`] with
//! offset/limit retrieval.
//!
//! The crate is the core of an upload service; HTTP framing, auth, rate
//! limiting and configuration loading live outside it. Callers hand
//! [`pipeline::Ingestor::ingest`] the raw upload bytes, an upload id, and a
//! [`pipeline::CancelToken`], and get back an [`types::IngestionOutcome`]
//! with the accepted records plus accepted/rejected counts and rejection
//! reasons.
//!
//! ## Quick example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use xlsx_ingest::pipeline::{CancelToken, IngestOptions, Ingestor};
//! use xlsx_ingest::store::RecordStore;
//!
//! # fn main() -> Result<(), xlsx_ingest::IngestError> {
//! let store = Arc::new(RecordStore::new());
//! let ingestor = Ingestor::new(IngestOptions::default(), Arc::clone(&store));
//!
//! let bytes = std::fs::read("upload.xlsx").expect("read upload");
//! let outcome = ingestor.ingest(&bytes, "upload-1", &CancelToken::new())?;
//! println!(
//!     "accepted={} rejected={}",
//!     outcome.rows_accepted, outcome.rows_rejected
//! );
//!
//! let (page, total) = store.list(10, 0)?;
//! println!("page={} total={total}", page.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Behavior notes
//!
//! - Only the first sheet of a workbook is consumed.
//! - Workbooks whose first row has a single column and that are taller than
//!   8 rows are treated as having a 7-row title preamble; the header is then
//!   row 7 and data starts at row 8 (see [`sheet::header::detect`]).
//! - A data row whose every cell trims to empty is rejected with reason
//!   `"empty row"`; any other row becomes exactly one record.
//! - Records are returned and stored in worker completion order. The reserved
//!   `"Transaction Index"` field ([`types::TRANSACTION_INDEX_KEY`]) carries
//!   each row's 1-based sheet position and is the way to recover original
//!   order.
//! - Blank cells are stored as [`types::FieldValue::Absent`] (JSON `null`),
//!   never as empty strings.
//!
//! ## Modules
//!
//! - [`sheet`]: workbook reading, header detection, row parsing
//! - [`pipeline`]: the worker-pool coordinator, cancellation, observability
//! - [`store`]: the append-only record store with pagination
//! - [`types`]: records, field values, ingestion outcomes
//! - [`error`]: the pipeline error taxonomy

pub mod error;
pub mod pipeline;
pub mod sheet;
pub mod store;
pub mod types;

pub use error::{IngestError, IngestResult};
