use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::processing::FilterStats;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted { tables: usize },
    TableStarted { index: usize, rows: usize },
    TableFinished { index: usize, stats: FilterStats },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("{event:?}");
    }
}

/// Real-time counters for an execution run.
///
/// The engine updates these while tables are processed; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    tables_started: AtomicU64,
    tables_finished: AtomicU64,
    rows_seen: AtomicU64,
    rows_deleted: AtomicU64,
    metrics_registered: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            tables_started: AtomicU64::new(0),
            tables_finished: AtomicU64::new(0),
            rows_seen: AtomicU64::new(0),
            rows_deleted: AtomicU64::new(0),
            metrics_registered: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst);

        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.tables_started.store(0, Ordering::SeqCst);
        self.tables_finished.store(0, Ordering::SeqCst);
        self.rows_seen.store(0, Ordering::SeqCst);
        self.rows_deleted.store(0, Ordering::SeqCst);
        self.metrics_registered.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_table_start(&self, rows: usize) {
        let _ = self.tables_started.fetch_add(1, Ordering::SeqCst);
        let _ = self.rows_seen.fetch_add(rows as u64, Ordering::SeqCst);
    }

    pub fn on_table_end(&self, stats: &FilterStats) {
        let _ = self.tables_finished.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .rows_deleted
            .fetch_add(stats.rows_deleted as u64, Ordering::SeqCst);
        let _ = self
            .metrics_registered
            .fetch_add(stats.metrics_registered as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            tables_started: self.tables_started.load(Ordering::SeqCst),
            tables_finished: self.tables_finished.load(Ordering::SeqCst),
            rows_seen: self.rows_seen.load(Ordering::SeqCst),
            rows_deleted: self.rows_deleted.load(Ordering::SeqCst),
            metrics_registered: self.metrics_registered.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub tables_started: u64,
    pub tables_finished: u64,
    pub rows_seen: u64,
    pub rows_deleted: u64,
    pub metrics_registered: u64,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, tables={}/{}, rows_seen={}, rows_deleted={}, metrics_registered={}, elapsed={:?}",
            self.run_id,
            self.tables_finished,
            self.tables_started,
            self.rows_seen,
            self.rows_deleted,
            self.metrics_registered,
            self.elapsed
        )
    }
}
