//! Core data model: an aggregated report [`DataTable`] made of keyed [`Row`]s plus
//! [`TableMetadata`].
//!
//! Tables are produced upstream (aggregation/archiving) and consumed downstream (rendering).
//! The processed-metrics filter only deletes rows and appends metadata.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::ProcessedMetric;

/// Metadata name of the ordered list of processed metrics registered on a table.
pub const EXTRA_PROCESSED_METRICS: &str = "extra_processed_metrics";

/// A single cell value in a [`Row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string (labels, or counters exported as text).
    Utf8(String),
}

impl Value {
    /// Numeric view of this value.
    ///
    /// Integers and floats convert directly, booleans become `0`/`1`, strings are parsed.
    /// Returns `None` for `Null`, for strings that are not numbers, and for NaN or infinite
    /// values (including the strings `"NaN"` and `"inf"`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v).filter(|v| v.is_finite()),
            Value::Utf8(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => Value::Int64(v),
            Err(_) => Value::Float64(v as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

/// Opaque key identifying a row within its [`DataTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A report row: column key -> value.
///
/// Keys are raw-column names (`nb_visits`), their numeric ids (`"2"`), or any other
/// column the upstream stage produced (`label`, already-computed metrics, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from `(column, value)` pairs.
    pub fn from_columns<I, K, V>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Set a column, returning the previous value if any.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Remove a column, returning its value if it was present.
    pub fn delete(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    /// Iterate columns in key order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Table-level side channel read by later pipeline stages.
///
/// The list of registered processed metrics has its own typed slot; everything else goes into
/// the open `entries` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Processed metrics a renderer should evaluate per row, in presentation order.
    ///
    /// `None` means no stage has registered any yet.
    #[serde(
        rename = "extra_processed_metrics",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_processed_metrics: Option<Vec<ProcessedMetric>>,
    /// Other metadata entries, keyed by name.
    #[serde(flatten)]
    pub entries: BTreeMap<String, serde_json::Value>,
}

impl TableMetadata {
    /// Registered processed metrics, or an empty slice if none are registered.
    pub fn processed_metrics(&self) -> &[ProcessedMetric] {
        self.extra_processed_metrics.as_deref().unwrap_or(&[])
    }

    /// Free-form metadata entry `name`, if present.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.entries.get(name)
    }

    /// Set a free-form metadata entry.
    ///
    /// # Panics
    ///
    /// Panics if `name` is [`EXTRA_PROCESSED_METRICS`]; that entry is typed and must be set via
    /// [`Self::extra_processed_metrics`].
    pub fn set(&mut self, name: impl Into<String>, value: serde_json::Value) {
        let name = name.into();
        assert!(
            name != EXTRA_PROCESSED_METRICS,
            "'{EXTRA_PROCESSED_METRICS}' is a typed metadata slot"
        );
        self.entries.insert(name, value);
    }

    /// Remove a free-form metadata entry.
    pub fn remove(&mut self, name: &str) -> Option<serde_json::Value> {
        self.entries.remove(name)
    }
}

/// In-memory report table.
///
/// Rows are kept in insertion order and addressed by [`RowId`]. Deleting a row never changes
/// the ids of the remaining rows.
///
/// On deserialization the id counter is moved past the largest stored row id, so rows added
/// afterwards never overwrite existing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredDataTable")]
pub struct DataTable {
    rows: BTreeMap<RowId, Row>,
    next_id: u64,
    /// Table metadata.
    pub metadata: TableMetadata,
}

#[derive(Deserialize)]
struct StoredDataTable {
    #[serde(default)]
    rows: BTreeMap<RowId, Row>,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    metadata: TableMetadata,
}

impl From<StoredDataTable> for DataTable {
    fn from(stored: StoredDataTable) -> Self {
        let after_last = stored
            .rows
            .keys()
            .next_back()
            .map_or(0, |id| id.0.saturating_add(1));
        Self {
            next_id: stored.next_id.max(after_last),
            rows: stored.rows,
            metadata: stored.metadata,
        }
    }
}

impl DataTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows, assigning ids in iteration order.
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.add_row(row);
        }
        table
    }

    /// Append a row and return its id.
    pub fn add_row(&mut self, row: Row) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    /// Row `id`, if it has not been deleted.
    pub fn get_row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    pub fn get_row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.get_mut(&id)
    }

    /// Delete a row, returning it if it was present.
    pub fn delete_row(&mut self, id: RowId) -> Option<Row> {
        self.rows.remove(&id)
    }

    /// Snapshot of the current row ids, in table order.
    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.keys().copied().collect()
    }

    /// Iterate rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Delete every row for which `predicate` returns `true`. Returns the number deleted.
    ///
    /// The ids to delete are collected from a snapshot before any deletion happens, so no row is
    /// skipped or visited twice.
    pub fn delete_rows_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let doomed: Vec<RowId> = self
            .rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.rows.remove(id);
        }
        doomed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DataTable {
        DataTable::from_rows(vec![
            Row::from_columns([("label", Value::from("a")), ("nb_visits", Value::from(1))]),
            Row::from_columns([("label", Value::from("b")), ("nb_visits", Value::from(0))]),
            Row::from_columns([("label", Value::from("c")), ("nb_visits", Value::from(3))]),
        ])
    }

    #[test]
    fn value_as_f64_coerces_numeric_like_values() {
        assert_eq!(Value::Int64(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float64(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::Utf8(" 12 ".to_string()).as_f64(), Some(12.0));
        assert_eq!(Value::Utf8("abc".to_string()).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn value_as_f64_rejects_nan_and_infinity() {
        for text in ["NaN", "nan", "inf", "-inf", "infinity", " Infinity "] {
            assert_eq!(Value::Utf8(text.to_string()).as_f64(), None, "{text}");
        }
        assert_eq!(Value::Float64(f64::NAN).as_f64(), None);
        assert_eq!(Value::Float64(f64::NEG_INFINITY).as_f64(), None);
        assert_eq!(Value::Utf8("1e3".to_string()).as_f64(), Some(1000.0));
    }

    #[test]
    fn row_ids_survive_deletion() {
        let mut table = sample_table();
        let ids = table.row_ids();
        assert_eq!(ids.len(), 3);

        let removed = table.delete_row(ids[1]).unwrap();
        assert_eq!(removed.get("label"), Some(&Value::from("b")));
        assert_eq!(table.row_count(), 2);
        assert!(table.get_row(ids[1]).is_none());
        assert_eq!(table.get_row(ids[2]).unwrap().get("label"), Some(&Value::from("c")));

        // New ids never reuse deleted ones.
        let new_id = table.add_row(Row::new());
        assert!(!ids.contains(&new_id));
    }

    #[test]
    fn delete_rows_where_removes_every_match() {
        let mut table = sample_table();
        let deleted = table.delete_rows_where(|row| {
            matches!(row.get("nb_visits"), Some(Value::Int64(v)) if *v < 3)
        });
        assert_eq!(deleted, 2);
        let labels: Vec<_> = table.rows().map(|(_, r)| r.get("label").cloned()).collect();
        assert_eq!(labels, vec![Some(Value::from("c"))]);
    }

    #[test]
    fn delete_rows_where_on_empty_table_is_noop() {
        let mut table = DataTable::new();
        assert_eq!(table.delete_rows_where(|_| true), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn deserialized_table_never_reuses_stored_row_ids() {
        let json = serde_json::json!({
            "rows": { "0": { "label": "kept" }, "4": { "label": "also kept" } },
            "next_id": 0,
            "metadata": {},
        });
        let mut table: DataTable = serde_json::from_value(json).unwrap();

        let id = table.add_row(Row::from_columns([("label", "new")]));
        assert_eq!(id, RowId(5));
        let labels: Vec<_> = table.rows().map(|(_, r)| r.get("label").cloned()).collect();
        assert_eq!(
            labels,
            vec![
                Some(Value::from("kept")),
                Some(Value::from("also kept")),
                Some(Value::from("new")),
            ]
        );
    }

    #[test]
    fn table_serde_round_trip_keeps_id_counter() {
        let mut table = sample_table();
        let ids = table.row_ids();
        table.delete_row(ids[2]);

        let mut back: DataTable =
            serde_json::from_str(&serde_json::to_string(&table).unwrap()).unwrap();
        assert_eq!(back, table);
        assert!(!ids.contains(&back.add_row(Row::new())));
    }

    #[test]
    fn metadata_serializes_typed_slot_next_to_entries() {
        let mut meta = TableMetadata::default();
        meta.set("period", serde_json::json!("day"));
        meta.extra_processed_metrics = Some(vec![ProcessedMetric::BounceRate]);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "extra_processed_metrics": ["bounce_rate"],
                "period": "day",
            })
        );

        let back: TableMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    #[should_panic(expected = "typed metadata slot")]
    fn metadata_set_rejects_typed_slot_name() {
        let mut meta = TableMetadata::default();
        meta.set(EXTRA_PROCESSED_METRICS, serde_json::json!([]));
    }
}
