//! Processed metric definitions.
//!
//! Each [`ProcessedMetric`] is a stateless definition: a stable name, the raw columns it reads,
//! and a pure compute rule over a [`Row`]. Definitions are registered on a table and evaluated
//! lazily by whoever renders it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Row;

use super::accessor::{DefaultColumnAccessor, RawColumnAccessor};
use super::columns::RawColumn;
use super::ratio::RatioPolicy;

/// How a renderer is expected to present a processed value.
///
/// This is only a hint; no formatting happens in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    /// Plain number.
    Number,
    /// Fraction in `[0, 1]`, shown as a percentage.
    Percent,
    /// Whole seconds, shown as a duration.
    Duration,
}

/// A derived metric computed from the raw counters of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessedMetric {
    /// `nb_visits_converted / nb_visits`
    #[serde(rename = "conversion_rate")]
    ConversionRate,
    /// `nb_actions / nb_visits`
    #[serde(rename = "nb_actions_per_visit")]
    ActionsPerVisit,
    /// `visit_length / nb_visits`, whole seconds
    #[serde(rename = "avg_time_on_site")]
    AverageTimeOnSite,
    /// `bounce_count / nb_visits`
    #[serde(rename = "bounce_rate")]
    BounceRate,
}

impl ProcessedMetric {
    /// Every definition, in the order the metrics filter registers them.
    pub const ALL: [ProcessedMetric; 4] = [
        ProcessedMetric::ConversionRate,
        ProcessedMetric::ActionsPerVisit,
        ProcessedMetric::AverageTimeOnSite,
        ProcessedMetric::BounceRate,
    ];

    /// Stable output column name.
    pub const fn name(self) -> &'static str {
        match self {
            ProcessedMetric::ConversionRate => "conversion_rate",
            ProcessedMetric::ActionsPerVisit => "nb_actions_per_visit",
            ProcessedMetric::AverageTimeOnSite => "avg_time_on_site",
            ProcessedMetric::BounceRate => "bounce_rate",
        }
    }

    /// English column label.
    pub const fn label(self) -> &'static str {
        match self {
            ProcessedMetric::ConversionRate => "Conversion Rate",
            ProcessedMetric::ActionsPerVisit => "Actions per Visit",
            ProcessedMetric::AverageTimeOnSite => "Avg. Time on Website",
            ProcessedMetric::BounceRate => "Bounce Rate",
        }
    }

    pub const fn format(self) -> MetricFormat {
        match self {
            ProcessedMetric::ConversionRate | ProcessedMetric::BounceRate => MetricFormat::Percent,
            ProcessedMetric::ActionsPerVisit => MetricFormat::Number,
            ProcessedMetric::AverageTimeOnSite => MetricFormat::Duration,
        }
    }

    /// `(numerator, denominator)` columns of the ratio.
    const fn operands(self) -> (RawColumn, RawColumn) {
        match self {
            ProcessedMetric::ConversionRate => (RawColumn::NbVisitsConverted, RawColumn::NbVisits),
            ProcessedMetric::ActionsPerVisit => (RawColumn::NbActions, RawColumn::NbVisits),
            ProcessedMetric::AverageTimeOnSite => (RawColumn::VisitLength, RawColumn::NbVisits),
            ProcessedMetric::BounceRate => (RawColumn::BounceCount, RawColumn::NbVisits),
        }
    }

    /// Raw columns this metric reads. Nothing else in the row affects its value.
    pub const fn required_columns(self) -> &'static [RawColumn] {
        match self {
            ProcessedMetric::ConversionRate => &[RawColumn::NbVisitsConverted, RawColumn::NbVisits],
            ProcessedMetric::ActionsPerVisit => &[RawColumn::NbActions, RawColumn::NbVisits],
            ProcessedMetric::AverageTimeOnSite => &[RawColumn::VisitLength, RawColumn::NbVisits],
            ProcessedMetric::BounceRate => &[RawColumn::BounceCount, RawColumn::NbVisits],
        }
    }

    /// Rounding and zero-visit behavior used by [`Self::compute`].
    pub const fn default_policy(self) -> RatioPolicy {
        match self {
            ProcessedMetric::AverageTimeOnSite => RatioPolicy::new(0.0, 0),
            _ => RatioPolicy::new(0.0, super::ratio::DEFAULT_PRECISION),
        }
    }

    /// Compute this metric for `row` with the default accessor and policy.
    pub fn compute(self, row: &Row) -> f64 {
        self.compute_with(&DefaultColumnAccessor, row, self.default_policy())
    }

    /// Compute this metric with an explicit accessor and ratio policy.
    pub fn compute_with<A>(self, accessor: &A, row: &Row, policy: RatioPolicy) -> f64
    where
        A: RawColumnAccessor + ?Sized,
    {
        let (numerator, denominator) = self.operands();
        policy.apply(
            accessor.raw_value(row, numerator),
            accessor.raw_value(row, denominator),
        )
    }

    /// Parse a stable metric name, as produced by [`Self::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }
}

impl fmt::Display for ProcessedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
