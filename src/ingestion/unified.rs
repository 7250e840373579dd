//! Unified loading entrypoint.
//!
//! - If [`LoadOptions::format`] is `None`, the format is inferred from the file extension.
//! - If a [`MetricsObserver`] is provided, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{MetricsError, MetricsResult};
use crate::observability::{LoadContext, LoadStats, MetricsObserver, Severity};
use crate::types::DataTable;

use super::{csv, json};

/// Supported table file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
}

impl TableFormat {
    /// Parse a table format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling [`load_table_from_path`].
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<TableFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn MetricsObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Load a raw-counter table from `path`.
///
/// When an observer is configured, this function reports:
///
/// - `on_load_success` with the row count
/// - `on_load_failure` with a computed severity
/// - `on_alert` when that severity is >= `options.alert_at_or_above`
///
/// ```no_run
/// use processed_metrics::ingestion::{load_table_from_path, LoadOptions};
/// use processed_metrics::processing::add_columns_processed_metrics;
///
/// # fn main() -> Result<(), processed_metrics::MetricsError> {
/// let mut table = load_table_from_path("referrers.csv", &LoadOptions::default())?;
/// add_columns_processed_metrics(&mut table);
/// println!("rows={}", table.row_count());
/// # Ok(())
/// # }
/// ```
pub fn load_table_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> MetricsResult<DataTable> {
    let path = path.as_ref();
    let fmt = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = LoadContext {
        path: path.to_path_buf(),
        format: fmt,
    };

    let result = match fmt {
        TableFormat::Csv => csv::load_csv_from_path(path),
        TableFormat::Json => json::load_json_from_path(path),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(table) => obs.on_load_success(&ctx, LoadStats { rows: table.row_count() }),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_load_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn severity_for_error(e: &MetricsError) -> Severity {
    match e {
        MetricsError::Io(_) => Severity::Critical,
        MetricsError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        MetricsError::Json(err) if err.is_io() => Severity::Critical,
        MetricsError::Json(_) => Severity::Error,
        MetricsError::SchemaMismatch { .. } => Severity::Error,
        MetricsError::ParseError { .. } => Severity::Error,
    }
}

fn infer_format_from_path(path: &Path) -> MetricsResult<TableFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MetricsError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    TableFormat::from_extension(ext).ok_or_else(|| MetricsError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
