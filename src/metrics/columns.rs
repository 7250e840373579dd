//! Canonical raw counter columns read by processed metrics.

use std::fmt;

/// A raw, directly aggregated counter column.
///
/// Aggregated rows may carry these either under their name or under their compact numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawColumn {
    /// Number of visits.
    NbVisits,
    /// Number of actions (pageviews, downloads, ...).
    NbActions,
    /// Total visit duration in seconds.
    VisitLength,
    /// Visits with a single action.
    BounceCount,
    /// Visits that converted at least one goal.
    NbVisitsConverted,
}

impl RawColumn {
    /// All raw columns, ordered by id.
    pub const ALL: [RawColumn; 5] = [
        RawColumn::NbVisits,
        RawColumn::NbActions,
        RawColumn::VisitLength,
        RawColumn::BounceCount,
        RawColumn::NbVisitsConverted,
    ];

    /// Column name.
    pub const fn name(self) -> &'static str {
        match self {
            RawColumn::NbVisits => "nb_visits",
            RawColumn::NbActions => "nb_actions",
            RawColumn::VisitLength => "visit_length",
            RawColumn::BounceCount => "bounce_count",
            RawColumn::NbVisitsConverted => "nb_visits_converted",
        }
    }

    /// Numeric id used by the compact archive row format.
    pub const fn id(self) -> u32 {
        match self {
            RawColumn::NbVisits => 2,
            RawColumn::NbActions => 3,
            RawColumn::VisitLength => 5,
            RawColumn::BounceCount => 6,
            RawColumn::NbVisitsConverted => 7,
        }
    }

    /// Look up a column by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Look up a column by its numeric archive id.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}

impl fmt::Display for RawColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::RawColumn;

    #[test]
    fn names_and_ids_round_trip() {
        for column in RawColumn::ALL {
            assert_eq!(RawColumn::from_name(column.name()), Some(column));
            assert_eq!(RawColumn::from_id(column.id()), Some(column));
        }
        assert_eq!(RawColumn::from_name("nb_uniq_visitors"), None);
        assert_eq!(RawColumn::from_id(1), None);
    }
}
