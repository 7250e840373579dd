//! `processed-metrics` derives per-row analytics metrics from the raw counters of an aggregated
//! report table, and prunes rows that carry no activity.
//!
//! The primary entrypoint is [`processing::AddColumnsProcessedMetrics`] (or the shorthand
//! [`processing::add_columns_processed_metrics`]), which:
//!
//! 1. optionally deletes rows with zero visits and zero actions;
//! 2. appends the processed metric definitions to the table's
//!    [`types::TableMetadata::extra_processed_metrics`], after anything already registered.
//!
//! Definitions are not evaluated by the filter. A rendering or export stage computes them per row
//! on demand (see [`processing::evaluate_row`]).
//!
//! ## Processed metrics
//!
//! | name | formula | rounding |
//! |---|---|---|
//! | `conversion_rate` | `nb_visits_converted / nb_visits` | 2 decimals |
//! | `nb_actions_per_visit` | `nb_actions / nb_visits` | 2 decimals |
//! | `avg_time_on_site` | `visit_length / nb_visits` | whole seconds |
//! | `bounce_rate` | `bounce_count / nb_visits` | 2 decimals |
//!
//! Rows with no visits get `0` for every metric. Missing raw columns read as `0`.
//!
//! ## Example
//!
//! ```rust
//! use processed_metrics::metrics::ProcessedMetric;
//! use processed_metrics::processing::AddColumnsProcessedMetrics;
//! use processed_metrics::types::{DataTable, Row};
//!
//! let mut row = Row::from_columns([("label", "google.com")]);
//! row.set("nb_visits", 10);
//! row.set("nb_visits_converted", 2);
//! row.set("nb_actions", 30);
//! row.set("visit_length", 600);
//! row.set("bounce_count", 4);
//! let mut table = DataTable::from_rows(vec![row]);
//!
//! AddColumnsProcessedMetrics::new(true).filter(&mut table);
//!
//! let (_, row) = table.rows().next().unwrap();
//! for metric in table.metadata.processed_metrics() {
//!     println!("{} = {}", metric.label(), metric.compute(row));
//! }
//! assert_eq!(ProcessedMetric::AverageTimeOnSite.compute(row), 60.0);
//! ```
//!
//! ## Modules
//!
//! - [`metrics`]: processed metric definitions, raw columns, safe ratio helper
//! - [`processing`]: pruning, the processed-metrics filter, lazy evaluation
//! - [`types`]: table, row and metadata types
//! - [`ingestion`]: loading raw-counter tables from CSV/JSON
//! - [`execution`]: filtering batches of tables in parallel
//! - [`observability`]: observer hooks (stderr, file, `tracing`)
//! - [`error`]: error types used when loading tables

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod metrics;
pub mod observability;
pub mod processing;
pub mod types;

pub use error::{MetricsError, MetricsResult};
