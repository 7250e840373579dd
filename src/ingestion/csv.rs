//! CSV loading of raw-counter tables.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{MetricsError, MetricsResult};
use crate::types::{DataTable, Row, Value};

/// Load a CSV report into a [`DataTable`].
///
/// Rules:
///
/// - The CSV must have a header row; every header becomes a column key.
/// - Header names must be unique and non-empty.
/// - Cells parse as integers, then floats, else stay text. Empty cells are [`Value::Null`].
pub fn load_csv_from_path(path: impl AsRef<Path>) -> MetricsResult<DataTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    load_csv_from_reader(&mut rdr)
}

/// Load CSV data from an existing CSV reader.
pub fn load_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> MetricsResult<DataTable> {
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    if headers.is_empty() {
        return Err(MetricsError::SchemaMismatch {
            message: "csv has no header row".to_string(),
        });
    }

    let mut seen = HashSet::with_capacity(headers.len());
    for h in &headers {
        if h.is_empty() {
            return Err(MetricsError::SchemaMismatch {
                message: format!("empty column name in header. headers={headers:?}"),
            });
        }
        if !seen.insert(h.as_str()) {
            return Err(MetricsError::SchemaMismatch {
                message: format!("duplicate column '{h}' in header"),
            });
        }
    }

    let mut table = DataTable::new();
    for result in rdr.records() {
        let record = result?;
        let row = Row::from_columns(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, raw)| (h.clone(), parse_cell(raw))),
        );
        table.add_row(row);
    }
    Ok(table)
}

/// Integers, then finite floats, else text. `NaN`/`inf` stay text so they never read as numbers.
fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Value::Int64(v);
    }
    if let Some(v) = trimmed.parse::<f64>().ok().filter(|v| v.is_finite()) {
        return Value::Float64(v);
    }
    Value::Utf8(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes())
    }

    #[test]
    fn parses_cells_by_shape() {
        assert_eq!(parse_cell(" 42 "), Value::Int64(42));
        assert_eq!(parse_cell("1.5"), Value::Float64(1.5));
        assert_eq!(parse_cell("google.com"), Value::Utf8("google.com".to_string()));
        assert_eq!(parse_cell("   "), Value::Null);
    }

    #[test]
    fn non_finite_cells_stay_text() {
        assert_eq!(parse_cell("NaN"), Value::Utf8("NaN".to_string()));
        assert_eq!(parse_cell("inf"), Value::Utf8("inf".to_string()));
        assert_eq!(parse_cell("-Infinity"), Value::Utf8("-Infinity".to_string()));
    }

    #[test]
    fn non_finite_counters_read_as_zero_and_get_pruned() {
        let mut table = load_csv_from_reader(&mut reader(
            "label,nb_visits,nb_actions,nb_visits_converted\nx,NaN,0,1\ny,inf,inf,1\nz,2,3,1\n",
        ))
        .unwrap();

        let stats = crate::processing::add_columns_processed_metrics(&mut table);
        assert_eq!(stats.rows_deleted, 2);

        let (_, row) = table.rows().next().unwrap();
        assert_eq!(row.get("label"), Some(&Value::from("z")));
        for pv in crate::processing::evaluate_row(&table, row) {
            assert!(pv.value.is_finite(), "{}", pv.name);
        }
    }

    #[test]
    fn errors_on_duplicate_header() {
        let err = load_csv_from_reader(&mut reader("nb_visits,nb_visits\n1,2\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate column 'nb_visits'"));
    }

    #[test]
    fn errors_on_ragged_rows() {
        let err = load_csv_from_reader(&mut reader("label,nb_visits\na,1,2\n")).unwrap_err();
        assert!(matches!(err, MetricsError::Csv(_)));
    }
}
