//! Removal of rows that carry no activity.

use tracing::debug;

use crate::metrics::{DefaultColumnAccessor, RawColumn, RawColumnAccessor};
use crate::types::{DataTable, Row};

/// `true` when the row has neither visits nor actions.
///
/// A row with actions but no visit (e.g. a conversion attributed without a qualifying visit)
/// is still considered active.
pub fn has_no_activity(row: &Row) -> bool {
    has_no_activity_with(&DefaultColumnAccessor, row)
}

/// [`has_no_activity`] reading the counters through `accessor`.
pub fn has_no_activity_with<A>(accessor: &A, row: &Row) -> bool
where
    A: RawColumnAccessor + ?Sized,
{
    accessor.raw_value(row, RawColumn::NbVisits) == 0.0
        && accessor.raw_value(row, RawColumn::NbActions) == 0.0
}

/// Delete every row with zero visits and zero actions. Returns the number of deleted rows.
pub fn delete_rows_with_no_visit(table: &mut DataTable) -> usize {
    delete_rows_with_no_visit_with(table, &DefaultColumnAccessor)
}

/// [`delete_rows_with_no_visit`] reading the counters through `accessor`.
pub fn delete_rows_with_no_visit_with<A>(table: &mut DataTable, accessor: &A) -> usize
where
    A: RawColumnAccessor + ?Sized,
{
    let before = table.row_count();
    let deleted = table.delete_rows_where(|row| has_no_activity_with(accessor, row));
    debug!(rows_before = before, rows_deleted = deleted, "pruned zero-activity rows");
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn deletes_only_rows_with_no_visits_and_no_actions() {
        let mut table = DataTable::from_rows(vec![
            Row::from_columns([("label", "idle"), ("nb_visits", "0"), ("nb_actions", "0")]),
            Row::from_columns([("label", "conversion only"), ("nb_visits", "0"), ("nb_actions", "5")]),
            Row::from_columns([("label", "visits only"), ("nb_visits", "3"), ("nb_actions", "0")]),
            Row::from_columns([("label", "regular"), ("nb_visits", "3"), ("nb_actions", "9")]),
        ]);

        assert_eq!(delete_rows_with_no_visit(&mut table), 1);

        let labels: Vec<_> = table
            .rows()
            .filter_map(|(_, r)| r.get("label").cloned())
            .collect();
        assert_eq!(
            labels,
            vec![
                Value::from("conversion only"),
                Value::from("visits only"),
                Value::from("regular"),
            ]
        );
    }

    #[test]
    fn rows_without_counters_are_deleted() {
        let mut table = DataTable::from_rows(vec![Row::from_columns([("label", "empty")])]);
        assert_eq!(delete_rows_with_no_visit(&mut table), 1);
        assert!(table.is_empty());
    }

    #[test]
    fn consecutive_idle_rows_are_all_deleted() {
        let mut table = DataTable::from_rows((0..5).map(|_| Row::from_columns([("nb_visits", 0)])));
        assert_eq!(delete_rows_with_no_visit(&mut table), 5);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn reads_numeric_id_columns() {
        let mut table = DataTable::from_rows(vec![
            Row::from_columns([("2", 0), ("3", 0)]),
            Row::from_columns([("2", 1), ("3", 0)]),
        ]);
        assert_eq!(delete_rows_with_no_visit(&mut table), 1);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn custom_accessor_decides_what_counts_as_activity() {
        // Counters stored under a reporting-tool prefix.
        let prefixed = |row: &Row, column: RawColumn| {
            row.get(&format!("ga_{}", column.name()))
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        let mut table = DataTable::from_rows(vec![
            Row::from_columns([("label", "idle"), ("ga_nb_visits", "0"), ("nb_visits", "4")]),
            Row::from_columns([("label", "active"), ("ga_nb_visits", "2")]),
        ]);

        assert_eq!(delete_rows_with_no_visit_with(&mut table, &prefixed), 1);
        let (_, row) = table.rows().next().unwrap();
        assert_eq!(row.get("label"), Some(&Value::from("active")));
    }

    #[test]
    fn empty_table_is_noop() {
        let mut table = DataTable::new();
        assert_eq!(delete_rows_with_no_visit(&mut table), 0);
    }
}
