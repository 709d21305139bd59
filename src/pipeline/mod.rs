//! Ingestion coordinator: fans data rows out to a fixed-size worker pool,
//! fans parse results back in, and aggregates them into one
//! [`IngestionOutcome`].
//!
//! The pool has exactly [`IngestOptions::worker_pool_size`] threads; each job
//! carries one data row plus its 0-based ordinal. Results are collected in
//! completion order, which is also the order of the emitted record list; the
//! reserved "Transaction Index" field is the durable record of original row
//! position. A [`CancelToken`] threads through submission and collection;
//! once it fires the run fails with [`IngestError::Cancelled`] and nothing
//! reaches the store.

mod observer;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Instant;

use chrono::Utc;
use rayon::{ThreadPool, ThreadPoolBuilder};
use uuid::Uuid;

use crate::error::{IngestError, IngestResult};
use crate::sheet;
use crate::store::RecordStore;
use crate::types::{IngestionOutcome, ParsedRow, Record};

pub use observer::{
    IngestEvent, IngestMetrics, IngestMetricsSnapshot, IngestObserver, StdErrIngestObserver,
};

/// Cooperative cancellation signal for an ingestion run.
///
/// Cloning is cheap; all clones share one flag. The upload-level timeout of
/// the external HTTP layer manifests here as the same token firing mid-parse.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Irreversible.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether the signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Configuration for the [`Ingestor`].
#[derive(Clone)]
pub struct IngestOptions {
    /// Number of worker threads parsing rows concurrently.
    ///
    /// Fixed per ingestor, never derived from row count. Must be >= 1.
    pub worker_pool_size: usize,
    /// Optional observer for run events (metrics/logging).
    pub observer: Option<Arc<dyn IngestObserver>>,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("worker_pool_size", &self.worker_pool_size)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            worker_pool_size: 10,
            observer: None,
        }
    }
}

/// The ingestion coordinator.
///
/// Owns the worker pool; the [`RecordStore`] is constructed and owned by the
/// caller and injected here, so multiple independent ingestors/stores can
/// coexist in one process.
pub struct Ingestor {
    pool: ThreadPool,
    opts: IngestOptions,
    store: Arc<RecordStore>,
    metrics: Arc<IngestMetrics>,
}

impl Ingestor {
    /// Create an ingestor with its own worker pool.
    ///
    /// # Panics
    ///
    /// Panics if `opts.worker_pool_size == 0`.
    pub fn new(opts: IngestOptions, store: Arc<RecordStore>) -> Self {
        assert!(opts.worker_pool_size > 0, "worker_pool_size must be > 0");

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.worker_pool_size)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            opts,
            store,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Get a handle to real-time run metrics.
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Ingest one uploaded workbook image.
    ///
    /// Opens the workbook, detects the header row, parses every data row on
    /// the worker pool, and appends accepted records to the store. Reader and
    /// header-detector errors propagate unchanged. Exactly N results are
    /// collected for N data rows; `rows_accepted + rows_rejected == N` always
    /// holds in the returned outcome.
    pub fn ingest(
        &self,
        bytes: &[u8],
        upload_id: &str,
        cancel: &CancelToken,
    ) -> IngestResult<IngestionOutcome> {
        let rows = sheet::read_first_sheet(bytes)?;
        let layout = sheet::header::detect(&rows)?;

        let headers = Arc::new(layout.headers);
        let data_rows = &rows[layout.data_start..];
        let n = data_rows.len();

        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(IngestEvent::RunStarted {
            upload_id: upload_id.to_string(),
            data_rows: n,
        });

        let (tx, rx) = mpsc::channel::<ParsedRow>();

        for (index, row) in data_rows.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.cancelled(upload_id));
            }

            let mut cells = row.clone();
            cells.resize(headers.len(), String::new());

            let tx = tx.clone();
            let cancel = cancel.clone();
            let headers = Arc::clone(&headers);
            let metrics = Arc::clone(&self.metrics);
            let observer = self.opts.observer.clone();

            self.pool.spawn(move || {
                // A cancelled run drops its jobs; the collector reads the
                // resulting channel disconnect as cancellation.
                if cancel.is_cancelled() {
                    return;
                }

                metrics.on_job_start();
                let parsed = sheet::row::parse_row(&headers, &cells, index);
                let accepted = matches!(parsed, ParsedRow::Accepted { .. });
                metrics.on_job_end(accepted);

                if let Some(obs) = &observer {
                    obs.on_event(&IngestEvent::RowParsed {
                        ordinal: (index + 1) as u64,
                        accepted,
                    });
                }

                let _ = tx.send(parsed);
            });
        }
        drop(tx);

        let mut outcome = IngestionOutcome {
            upload_id: upload_id.to_string(),
            records: Vec::with_capacity(n),
            rows_accepted: 0,
            rows_rejected: 0,
            errors: Vec::new(),
        };

        for _ in 0..n {
            if cancel.is_cancelled() {
                return Err(self.cancelled(upload_id));
            }

            let parsed = match rx.recv() {
                Ok(parsed) => parsed,
                // All senders gone before N results: workers skipped their
                // jobs, which only happens on cancellation.
                Err(_) => return Err(self.cancelled(upload_id)),
            };

            match parsed {
                ParsedRow::Accepted { fields, .. } => {
                    outcome.records.push(Record {
                        id: Uuid::new_v4(),
                        upload_id: upload_id.to_string(),
                        fields,
                        created_at: Utc::now(),
                    });
                    outcome.rows_accepted += 1;
                }
                ParsedRow::Rejected { reason } => {
                    outcome.rows_rejected += 1;
                    if !reason.is_empty() {
                        outcome.errors.push(reason);
                    }
                }
            }
        }

        if !outcome.records.is_empty() {
            self.store.append(outcome.records.clone())?;
        }

        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(IngestEvent::RunFinished {
            upload_id: upload_id.to_string(),
            elapsed,
            metrics: self.metrics.snapshot(),
        });

        Ok(outcome)
    }

    fn cancelled(&self, upload_id: &str) -> IngestError {
        self.emit(IngestEvent::RunCancelled {
            upload_id: upload_id.to_string(),
        });
        IngestError::Cancelled
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(obs) = &self.opts.observer {
            obs.on_event(&event);
        }
    }
}
