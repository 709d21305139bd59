use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Pipeline events emitted during an ingestion run.
///
/// `RowParsed` is emitted from pool workers, so observers see it concurrently
/// and out of row order.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    RunStarted {
        upload_id: String,
        data_rows: usize,
    },
    RowParsed {
        ordinal: u64,
        accepted: bool,
    },
    RunCancelled {
        upload_id: String,
    },
    RunFinished {
        upload_id: String,
        elapsed: Duration,
        metrics: IngestMetricsSnapshot,
    },
}

/// Observer hook for ingestion events.
pub trait IngestObserver: Send + Sync {
    fn on_event(&self, event: &IngestEvent);
}

/// A simple stderr logger for ingestion events.
#[derive(Default)]
pub struct StdErrIngestObserver;

impl IngestObserver for StdErrIngestObserver {
    fn on_event(&self, event: &IngestEvent) {
        eprintln!("[ingest] {event:?}");
    }
}

/// Real-time metrics for an ingestion run.
///
/// The coordinator updates these counters during a run; callers can snapshot
/// them at any time via [`crate::pipeline::Ingestor::metrics`]. Counters reset
/// at the start of each run.
pub struct IngestMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_parsed: AtomicU64,
    rows_accepted: AtomicU64,
    rows_rejected: AtomicU64,

    active_jobs: AtomicUsize,
    max_active_jobs: AtomicUsize,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            rows_parsed: AtomicU64::new(0),
            rows_accepted: AtomicU64::new(0),
            rows_rejected: AtomicU64::new(0),
            active_jobs: AtomicUsize::new(0),
            max_active_jobs: AtomicUsize::new(0),
        }
    }

    pub(crate) fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.rows_parsed.store(0, Ordering::SeqCst);
        self.rows_accepted.store(0, Ordering::SeqCst);
        self.rows_rejected.store(0, Ordering::SeqCst);
        self.active_jobs.store(0, Ordering::SeqCst);
        self.max_active_jobs.store(0, Ordering::SeqCst);
    }

    pub(crate) fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub(crate) fn on_job_start(&self) {
        let now = self.active_jobs.fetch_add(1, Ordering::SeqCst) + 1;
        update_max_usize(&self.max_active_jobs, now);
    }

    pub(crate) fn on_job_end(&self, accepted: bool) {
        let _ = self.rows_parsed.fetch_add(1, Ordering::SeqCst);
        if accepted {
            let _ = self.rows_accepted.fetch_add(1, Ordering::SeqCst);
        } else {
            let _ = self.rows_rejected.fetch_add(1, Ordering::SeqCst);
        }
        let _ = self.active_jobs.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> IngestMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        IngestMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            rows_parsed: self.rows_parsed.load(Ordering::SeqCst),
            rows_accepted: self.rows_accepted.load(Ordering::SeqCst),
            rows_rejected: self.rows_rejected.load(Ordering::SeqCst),
            max_active_jobs: self.max_active_jobs.load(Ordering::SeqCst),
        }
    }
}

impl Default for IngestMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn update_max_usize(dst: &AtomicUsize, now: usize) {
    loop {
        let cur = dst.load(Ordering::SeqCst);
        if now <= cur {
            break;
        }
        if dst
            .compare_exchange(cur, now, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            break;
        }
    }
}

/// Immutable snapshot of [`IngestMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub rows_parsed: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    pub max_active_jobs: usize,
}

impl fmt::Display for IngestMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows_parsed={}, accepted/rejected={}/{}, max_active_jobs={}, elapsed={:?}",
            self.run_id,
            self.rows_parsed,
            self.rows_accepted,
            self.rows_rejected,
            self.max_active_jobs,
            self.elapsed
        )
    }
}
