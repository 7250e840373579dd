//! JSON loading of raw-counter tables.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"nb_visits":1}, {"nb_visits":2}]`
//! - A single JSON object (one row)
//! - Newline-delimited JSON (NDJSON): `{"nb_visits":1}\n{"nb_visits":2}\n`
//!
//! Values must be scalars; nested arrays/objects are rejected.

use std::fs;
use std::path::Path;

use crate::error::{MetricsError, MetricsResult};
use crate::types::{DataTable, Row, Value};

/// Load a JSON report into a [`DataTable`].
pub fn load_json_from_path(path: impl AsRef<Path>) -> MetricsResult<DataTable> {
    let text = fs::read_to_string(path)?;
    load_json_from_str(&text)
}

/// Load JSON from an in-memory string into a [`DataTable`].
pub fn load_json_from_str(input: &str) -> MetricsResult<DataTable> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MetricsError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    // A single JSON document first, NDJSON otherwise.
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match v {
            serde_json::Value::Array(items) => table_from_json_values(&items),
            serde_json::Value::Object(_) => table_from_json_values(std::slice::from_ref(&v)),
            _ => Err(MetricsError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            }),
        }
    } else {
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                MetricsError::SchemaMismatch {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                }
            })?;
            values.push(v);
        }
        table_from_json_values(&values)
    }
}

fn table_from_json_values(values: &[serde_json::Value]) -> MetricsResult<DataTable> {
    let mut table = DataTable::new();
    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v.as_object().ok_or_else(|| MetricsError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row = Row::new();
        for (column, jv) in obj {
            row.set(column.clone(), convert_json_value(row_num, column, jv)?);
        }
        table.add_row(row);
    }
    Ok(table)
}

fn convert_json_value(row: usize, column: &str, v: &serde_json::Value) -> MetricsResult<Value> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::String(s) => Ok(Value::Utf8(s.clone())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int64(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float64(f))
            } else {
                Err(MetricsError::ParseError {
                    row,
                    column: column.to_string(),
                    raw: v.to_string(),
                    message: "number out of range".to_string(),
                })
            }
        }
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(MetricsError::ParseError {
            row,
            column: column.to_string(),
            raw: v.to_string(),
            message: "expected scalar value".to_string(),
        }),
    }
}
