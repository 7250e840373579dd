//! Loading raw-counter report tables from files.
//!
//! Most callers should use [`load_table_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`LoadOptions`])
//! - loads every column of every row into a [`crate::types::DataTable`]
//! - optionally reports success/failure/alerts to a [`crate::observability::MetricsObserver`]
//!
//! Format-specific functions are also available under [`csv`] and [`json`].

pub mod csv;
pub mod json;
pub mod unified;

pub use unified::{load_table_from_path, LoadOptions, TableFormat};
