//! Processed metric definitions and the numeric helpers they are built on.
//!
//! - [`safe_ratio`] / [`RatioPolicy`]: division with a default for a zero denominator
//! - [`RawColumn`] / [`RawColumnAccessor`]: reading raw counters out of a row
//! - [`ProcessedMetric`]: conversion rate, actions per visit, average time on site, bounce rate
//!
//! ```rust
//! use processed_metrics::metrics::ProcessedMetric;
//! use processed_metrics::types::Row;
//!
//! let row = Row::from_columns([("nb_visits", 10), ("bounce_count", 4)]);
//! assert_eq!(ProcessedMetric::BounceRate.compute(&row), 0.4);
//! ```

pub mod accessor;
pub mod columns;
pub mod processed;
pub mod ratio;

pub use accessor::{raw_column, DefaultColumnAccessor, RawColumnAccessor};
pub use columns::RawColumn;
pub use processed::{MetricFormat, ProcessedMetric};
pub use ratio::{round_to, safe_ratio, RatioPolicy, DEFAULT_PRECISION, MAX_PRECISION};
