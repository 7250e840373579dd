//! Parallel execution of the processed-metrics filter over many tables.
//!
//! Tables are independent of each other and [`crate::metrics::ProcessedMetric`] definitions are
//! stateless, so a batch of report tables can be filtered concurrently. Each table is still
//! processed by exactly one worker.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - a dedicated rayon thread pool with a configurable size
//! - real-time metrics + observer hooks for monitoring

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use serde::Deserialize;

use crate::metrics::RawColumnAccessor;
use crate::processing::{AddColumnsProcessedMetrics, FilterStats};
use crate::types::DataTable;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver,
    StdErrExecutionObserver,
};

/// Configuration for the [`ExecutionEngine`].
///
/// Deserializable so it can be embedded in a host application's config file; missing fields
/// take their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Delete rows with zero visits and zero actions before registering metrics.
    pub delete_rows_with_no_visit: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            num_threads: None,
            delete_rows_with_no_visit: true,
        }
    }
}

/// Runs [`AddColumnsProcessedMetrics`] over batches of tables.
pub struct ExecutionEngine {
    pool: ThreadPool,
    filter: AddColumnsProcessedMetrics,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `num_threads == Some(0)` or the thread pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> Self {
        if let Some(n) = opts.num_threads {
            assert!(n > 0, "num_threads must be > 0 when set");
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .expect("failed to build rayon thread pool");

        Self {
            pool,
            filter: AddColumnsProcessedMetrics::new(opts.delete_rows_with_no_visit),
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        }
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Read raw counters through `accessor` when pruning.
    pub fn with_accessor<A>(mut self, accessor: A) -> Self
    where
        A: RawColumnAccessor + Send + Sync + 'static,
    {
        self.filter = self.filter.with_accessor(accessor);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Filter every table in parallel. Stats are returned in the order of `tables`.
    pub fn apply_parallel(&self, tables: &mut [DataTable]) -> Vec<FilterStats> {
        self.pool.install(|| self.apply_parallel_impl(tables))
    }

    fn apply_parallel_impl(&self, tables: &mut [DataTable]) -> Vec<FilterStats> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            tables: tables.len(),
        });

        let stats: Vec<FilterStats> = tables
            .par_iter_mut()
            .enumerate()
            .map(|(index, table)| {
                let rows = table.row_count();
                self.metrics.on_table_start(rows);
                self.emit(ExecutionEvent::TableStarted { index, rows });

                let stats = self.filter.filter(table);

                self.metrics.on_table_end(&stats);
                self.emit(ExecutionEvent::TableFinished { index, stats });
                stats
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        stats
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
