//! Lazy evaluation of registered processed metrics.
//!
//! These helpers are what a rendering/export stage uses after
//! [`super::AddColumnsProcessedMetrics`] has run: they read the definitions from table metadata
//! and compute them for one row at a time.

use serde::Serialize;

use crate::metrics::{DefaultColumnAccessor, RawColumnAccessor};
use crate::types::{DataTable, Row};

/// A processed metric evaluated for one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedValue {
    /// Output column name of the metric.
    pub name: &'static str,
    pub value: f64,
}

/// Evaluate every processed metric registered on `table` for `row`, in registration order.
///
/// Duplicate registrations produce duplicate entries.
pub fn evaluate_row(table: &DataTable, row: &Row) -> Vec<ProcessedValue> {
    evaluate_row_with(table, row, &DefaultColumnAccessor)
}

/// [`evaluate_row`] reading raw counters through `accessor`, with each metric's default policy.
pub fn evaluate_row_with<A>(table: &DataTable, row: &Row, accessor: &A) -> Vec<ProcessedValue>
where
    A: RawColumnAccessor + ?Sized,
{
    table
        .metadata
        .processed_metrics()
        .iter()
        .map(|metric| ProcessedValue {
            name: metric.name(),
            value: metric.compute_with(accessor, row, metric.default_policy()),
        })
        .collect()
}

/// Export all rows as JSON objects: the row's own columns followed by the registered
/// processed metrics.
///
/// A processed metric whose name matches an existing column replaces that column.
pub fn to_json_records(table: &DataTable) -> serde_json::Value {
    let records = table
        .rows()
        .map(|(_, row)| {
            let mut obj = serde_json::Map::with_capacity(row.len() + 4);
            for (column, value) in row.columns() {
                obj.insert(
                    column.to_string(),
                    serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
                );
            }
            for pv in evaluate_row(table, row) {
                obj.insert(pv.name.to_string(), number_or_null(pv.value));
            }
            serde_json::Value::Object(obj)
        })
        .collect();
    serde_json::Value::Array(records)
}

fn number_or_null(v: f64) -> serde_json::Value {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
