//! Reading raw counters out of a [`Row`].

use crate::types::Row;

use super::columns::RawColumn;

/// Reads a raw counter from a row as a number.
///
/// Implementations must return `0.0` when the column is unset and must not mutate the row.
pub trait RawColumnAccessor {
    fn raw_value(&self, row: &Row, column: RawColumn) -> f64;
}

impl<F> RawColumnAccessor for F
where
    F: Fn(&Row, RawColumn) -> f64,
{
    fn raw_value(&self, row: &Row, column: RawColumn) -> f64 {
        self(row, column)
    }
}

/// Looks a column up by name, then by numeric id. Missing or non-numeric cells read as `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultColumnAccessor;

impl RawColumnAccessor for DefaultColumnAccessor {
    fn raw_value(&self, row: &Row, column: RawColumn) -> f64 {
        row.get(column.name())
            .or_else(|| row.get(&column.id().to_string()))
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }
}

/// Shorthand for [`DefaultColumnAccessor`].
pub fn raw_column(row: &Row, column: RawColumn) -> f64 {
    DefaultColumnAccessor.raw_value(row, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn reads_by_name() {
        let row = Row::from_columns([("nb_visits", 12)]);
        assert_eq!(raw_column(&row, RawColumn::NbVisits), 12.0);
    }

    #[test]
    fn falls_back_to_numeric_id() {
        let row = Row::from_columns([("2", 9), ("3", 27)]);
        assert_eq!(raw_column(&row, RawColumn::NbVisits), 9.0);
        assert_eq!(raw_column(&row, RawColumn::NbActions), 27.0);
    }

    #[test]
    fn name_wins_over_id() {
        let row = Row::from_columns([("nb_visits", 4), ("2", 100)]);
        assert_eq!(raw_column(&row, RawColumn::NbVisits), 4.0);
    }

    #[test]
    fn missing_null_and_text_read_as_zero() {
        let mut row = Row::new();
        assert_eq!(raw_column(&row, RawColumn::BounceCount), 0.0);
        row.set("bounce_count", Value::Null);
        assert_eq!(raw_column(&row, RawColumn::BounceCount), 0.0);
        row.set("bounce_count", "n/a");
        assert_eq!(raw_column(&row, RawColumn::BounceCount), 0.0);
    }

    #[test]
    fn closures_are_accessors() {
        let fixed = |_: &Row, c: RawColumn| c.id() as f64;
        assert_eq!(fixed.raw_value(&Row::new(), RawColumn::VisitLength), 5.0);
    }
}
