//! In-place table processing.
//!
//! - [`delete_rows_with_no_visit()`]: remove rows with zero visits and zero actions
//! - [`AddColumnsProcessedMetrics`]: prune, then register the processed metric definitions on
//!   the table metadata
//! - [`evaluate_row()`] / [`to_json_records()`]: compute the registered metrics per row, the way
//!   a renderer would
//!
//! ## Example: filter, then evaluate lazily
//!
//! ```rust
//! use processed_metrics::processing::{add_columns_processed_metrics, evaluate_row};
//! use processed_metrics::types::{DataTable, Row};
//!
//! let mut table = DataTable::from_rows(vec![
//!     Row::from_columns([
//!         ("nb_visits", 10),
//!         ("nb_visits_converted", 2),
//!         ("nb_actions", 30),
//!         ("visit_length", 600),
//!         ("bounce_count", 4),
//!     ]),
//!     // No visits and no actions: pruned.
//!     Row::from_columns([("nb_visits", 0), ("nb_actions", 0)]),
//! ]);
//!
//! let stats = add_columns_processed_metrics(&mut table);
//! assert_eq!(stats.rows_deleted, 1);
//!
//! let (_, row) = table.rows().next().unwrap();
//! let values: Vec<f64> = evaluate_row(&table, row).iter().map(|v| v.value).collect();
//! assert_eq!(values, vec![0.2, 3.0, 60.0, 0.4]);
//! ```

pub mod evaluate;
pub mod processed_metrics;
pub mod prune;

pub use evaluate::{evaluate_row, evaluate_row_with, to_json_records, ProcessedValue};
pub use processed_metrics::{
    add_columns_processed_metrics, dedup_extra_processed_metrics, AddColumnsProcessedMetrics,
    FilterStats, PROCESSED_METRICS,
};
pub use prune::{
    delete_rows_with_no_visit, delete_rows_with_no_visit_with, has_no_activity,
    has_no_activity_with,
};
