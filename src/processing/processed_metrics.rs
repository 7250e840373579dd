//! The processed-metrics filter: prune idle rows, then register the processed metric
//! definitions on the table so a renderer can compute them per row.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::metrics::{DefaultColumnAccessor, ProcessedMetric, RawColumnAccessor};
use crate::observability::MetricsObserver;
use crate::types::DataTable;

use super::prune::delete_rows_with_no_visit_with;

/// Definitions appended by [`AddColumnsProcessedMetrics`], in registration order.
pub const PROCESSED_METRICS: [ProcessedMetric; 4] = ProcessedMetric::ALL;

/// Outcome of one filter pass over a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Row count when the pass started.
    pub rows_before: usize,
    /// Rows deleted by zero-activity pruning.
    pub rows_deleted: usize,
    /// Definitions appended to the table metadata.
    pub metrics_registered: usize,
}

/// Adds conversion rate, actions per visit, average time on site and bounce rate to a table.
///
/// The metrics are not computed here. They are appended to
/// [`crate::types::TableMetadata::extra_processed_metrics`], after any entries already present,
/// and evaluated lazily downstream (see [`super::evaluate`]).
///
/// Applying the filter twice registers the definitions twice; use
/// [`dedup_extra_processed_metrics`] if that matters.
#[derive(Clone)]
pub struct AddColumnsProcessedMetrics {
    /// Delete rows with zero visits and zero actions before registering.
    pub delete_rows_with_no_visit: bool,
    /// Optional observer notified after each pass.
    pub observer: Option<Arc<dyn MetricsObserver>>,
    /// How pruning reads raw counters. Use the same accessor when evaluating the registered
    /// metrics (see [`super::evaluate_row_with`]).
    pub accessor: Arc<dyn RawColumnAccessor + Send + Sync>,
}

impl fmt::Debug for AddColumnsProcessedMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddColumnsProcessedMetrics")
            .field("delete_rows_with_no_visit", &self.delete_rows_with_no_visit)
            .field("observer_set", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for AddColumnsProcessedMetrics {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AddColumnsProcessedMetrics {
    /// Create a filter, reading raw counters with [`DefaultColumnAccessor`].
    pub fn new(delete_rows_with_no_visit: bool) -> Self {
        Self {
            delete_rows_with_no_visit,
            observer: None,
            accessor: Arc::new(DefaultColumnAccessor),
        }
    }

    /// Read raw counters through `accessor` when pruning.
    pub fn with_accessor<A>(mut self, accessor: A) -> Self
    where
        A: RawColumnAccessor + Send + Sync + 'static,
    {
        self.accessor = Arc::new(accessor);
        self
    }

    /// Attach an observer for filter passes.
    pub fn with_observer(mut self, observer: Arc<dyn MetricsObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the filter over `table`.
    pub fn filter(&self, table: &mut DataTable) -> FilterStats {
        let rows_before = table.row_count();
        let rows_deleted = if self.delete_rows_with_no_visit {
            delete_rows_with_no_visit_with(table, self.accessor.as_ref())
        } else {
            0
        };

        table
            .metadata
            .extra_processed_metrics
            .get_or_insert_with(Vec::new)
            .extend(PROCESSED_METRICS);

        let stats = FilterStats {
            rows_before,
            rows_deleted,
            metrics_registered: PROCESSED_METRICS.len(),
        };
        debug!(
            rows_before,
            rows_deleted,
            registered = table.metadata.processed_metrics().len(),
            "added processed metrics"
        );
        if let Some(obs) = &self.observer {
            obs.on_filter(&stats);
        }
        stats
    }
}

/// Run [`AddColumnsProcessedMetrics`] with default settings (pruning enabled).
pub fn add_columns_processed_metrics(table: &mut DataTable) -> FilterStats {
    AddColumnsProcessedMetrics::default().filter(table)
}

/// Drop repeated processed-metric registrations, keeping the first occurrence of each name.
/// Returns how many entries were removed.
pub fn dedup_extra_processed_metrics(table: &mut DataTable) -> usize {
    let Some(metrics) = table.metadata.extra_processed_metrics.as_mut() else {
        return 0;
    };
    let before = metrics.len();
    let mut seen = HashSet::with_capacity(before);
    metrics.retain(|m| seen.insert(m.name()));
    before - metrics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Row;
    use std::sync::Mutex;

    fn table_with_idle_row() -> DataTable {
        DataTable::from_rows(vec![
            Row::from_columns([("nb_visits", 10), ("nb_actions", 30)]),
            Row::from_columns([("nb_visits", 0), ("nb_actions", 0), ("nb_visits_converted", 0)]),
        ])
    }

    #[test]
    fn registers_metrics_in_fixed_order() {
        let mut table = table_with_idle_row();
        let stats = add_columns_processed_metrics(&mut table);

        assert_eq!(
            stats,
            FilterStats {
                rows_before: 2,
                rows_deleted: 1,
                metrics_registered: 4,
            }
        );
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.metadata.processed_metrics(), &ProcessedMetric::ALL);
    }

    #[test]
    fn keeps_idle_rows_when_pruning_disabled() {
        let mut table = table_with_idle_row();
        let stats = AddColumnsProcessedMetrics::new(false).filter(&mut table);
        assert_eq!(stats.rows_deleted, 0);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.metadata.processed_metrics().len(), 4);
    }

    #[test]
    fn appends_after_existing_registrations() {
        let mut table = table_with_idle_row();
        table.metadata.extra_processed_metrics = Some(vec![ProcessedMetric::BounceRate]);

        add_columns_processed_metrics(&mut table);

        assert_eq!(
            table.metadata.processed_metrics(),
            &[
                ProcessedMetric::BounceRate,
                ProcessedMetric::ConversionRate,
                ProcessedMetric::ActionsPerVisit,
                ProcessedMetric::AverageTimeOnSite,
                ProcessedMetric::BounceRate,
            ]
        );
    }

    #[test]
    fn is_not_idempotent_without_dedup() {
        let mut table = table_with_idle_row();
        add_columns_processed_metrics(&mut table);
        add_columns_processed_metrics(&mut table);
        assert_eq!(table.metadata.processed_metrics().len(), 8);

        assert_eq!(dedup_extra_processed_metrics(&mut table), 4);
        assert_eq!(table.metadata.processed_metrics(), &ProcessedMetric::ALL);
        assert_eq!(dedup_extra_processed_metrics(&mut table), 0);
    }

    #[test]
    fn dedup_without_registrations_is_noop() {
        let mut table = DataTable::new();
        assert_eq!(dedup_extra_processed_metrics(&mut table), 0);
        assert!(table.metadata.extra_processed_metrics.is_none());
    }

    #[test]
    fn other_metadata_is_untouched() {
        let mut table = table_with_idle_row();
        table.metadata.set("period", serde_json::json!("week"));
        add_columns_processed_metrics(&mut table);
        assert_eq!(table.metadata.get("period"), Some(&serde_json::json!("week")));
    }

    #[test]
    fn prunes_and_evaluates_through_the_same_accessor() {
        use crate::metrics::RawColumn;
        use crate::processing::evaluate_row_with;
        use crate::types::Value;

        // Counters nested under an "archive." prefix; plain names belong to another report.
        let archived = |row: &Row, column: RawColumn| {
            row.get(&format!("archive.{}", column.name()))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        let mut table = DataTable::from_rows(vec![
            Row::from_columns([("archive.nb_visits", 0), ("nb_visits", 7)]),
            Row::from_columns([("archive.nb_visits", 4), ("archive.bounce_count", 1)]),
        ]);

        let filter = AddColumnsProcessedMetrics::default().with_accessor(archived);
        let stats = filter.filter(&mut table);
        assert_eq!(stats.rows_deleted, 1);

        let (_, row) = table.rows().next().unwrap();
        let bounce = evaluate_row_with(&table, row, filter.accessor.as_ref())
            .into_iter()
            .find(|pv| pv.name == "bounce_rate")
            .unwrap();
        assert_eq!(bounce.value, 0.25);
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<FilterStats>>,
    }

    impl MetricsObserver for Recording {
        fn on_filter(&self, stats: &FilterStats) {
            self.seen.lock().unwrap().push(*stats);
        }
    }

    #[test]
    fn observer_sees_each_pass() {
        let obs = Arc::new(Recording::default());
        let filter = AddColumnsProcessedMetrics::default().with_observer(obs.clone());

        let mut table = table_with_idle_row();
        filter.filter(&mut table);
        filter.filter(&mut table);

        let seen = obs.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].rows_deleted, 1);
        assert_eq!(seen[1].rows_before, 1);
        assert_eq!(seen[1].rows_deleted, 0);
    }
}
