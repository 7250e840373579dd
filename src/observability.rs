//! Observer hooks for table loading and filter passes.
//!
//! Nothing in the crate logs unconditionally except `tracing` debug events; callers pick where
//! outcomes go by attaching a [`MetricsObserver`].

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MetricsError;
use crate::ingestion::TableFormat;
use crate::processing::FilterStats;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O and other infrastructure failures).
    Critical,
}

/// Context about a table load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Input path.
    pub path: PathBuf,
    /// Format used to decode it.
    pub format: TableFormat,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of loaded rows.
    pub rows: usize,
}

/// Observer interface for load outcomes and filter passes.
///
/// All methods default to no-ops.
pub trait MetricsObserver: Send + Sync {
    /// Called after each processed-metrics filter pass.
    fn on_filter(&self, _stats: &FilterStats) {}

    /// Called when a table load succeeds.
    fn on_load_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a table load fails.
    fn on_load_failure(&self, _ctx: &LoadContext, _severity: Severity, _error: &MetricsError) {}

    /// Called when a load failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_load_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        self.on_load_failure(ctx, severity, error)
    }
}

/// Fans callbacks out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn MetricsObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn MetricsObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl MetricsObserver for CompositeObserver {
    fn on_filter(&self, stats: &FilterStats) {
        for o in &self.observers {
            o.on_filter(stats);
        }
    }

    fn on_load_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_load_success(ctx, stats);
        }
    }

    fn on_load_failure(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        for o in &self.observers {
            o.on_load_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl MetricsObserver for StdErrObserver {
    fn on_filter(&self, stats: &FilterStats) {
        eprintln!(
            "[metrics][filter] rows_before={} rows_deleted={} registered={}",
            stats.rows_before, stats.rows_deleted, stats.metrics_registered
        );
    }

    fn on_load_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!(
            "[metrics][load][ok] format={:?} path={} rows={}",
            ctx.format,
            ctx.path.display(),
            stats.rows
        );
    }

    fn on_load_failure(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        eprintln!(
            "[metrics][load][{:?}] format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        eprintln!(
            "[ALERT][metrics][load][{:?}] format={:?} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }
}

/// Forwards events to the `tracing` ecosystem.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl MetricsObserver for TracingObserver {
    fn on_filter(&self, stats: &FilterStats) {
        tracing::info!(
            rows_before = stats.rows_before,
            rows_deleted = stats.rows_deleted,
            registered = stats.metrics_registered,
            "processed metrics filter"
        );
    }

    fn on_load_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(format = ?ctx.format, path = %ctx.path.display(), rows = stats.rows, "table loaded");
    }

    fn on_load_failure(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        tracing::warn!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "table load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        tracing::error!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            %error,
            "table load alert"
        );
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl MetricsObserver for FileObserver {
    fn on_filter(&self, stats: &FilterStats) {
        self.append_line(&format!(
            "{} filter rows_before={} rows_deleted={} registered={}",
            unix_ts(),
            stats.rows_before,
            stats.rows_deleted,
            stats.metrics_registered
        ));
    }

    fn on_load_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok format={:?} path={} rows={}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            stats.rows
        ));
    }

    fn on_load_failure(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: Severity, error: &MetricsError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
