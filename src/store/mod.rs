//! Record store abstraction for the survey tables.
//!
//! This module defines the `RecordStore` trait the table view, the forms and
//! the analytics dashboard are written against, with two implementations:
//! - `PostgresStore`: the hosted Postgres database behind the survey site
//! - `MemoryStore`: in-process tables, seeded with demo data for tests and
//!   offline use
//!
//! The trait is object-safe and `Send + Sync`; callers share one handle as
//! `Arc<dyn RecordStore>` and may issue calls from several threads at once.

mod config;
mod memory;
mod postgres;
mod queries;

pub use config::StoreConfig;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::model::{ColumnDescriptor, Row, Value};

/// Error types that can occur while talking to the record store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or the connection dropped.
    Connection(String),
    /// A query reached the store but failed.
    Query(String),
    /// The requested table or column does not exist.
    SchemaMismatch(String),
    /// The store refused a write (constraint or type violation).
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "query error: {}", msg),
            StoreError::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            StoreError::Rejected(msg) => write!(f, "write rejected: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Equality filter for [`RecordStore::count`].
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.value(&self.column) == &self.value
    }
}

/// Abstraction for the remote tabular data service.
pub trait RecordStore: Send + Sync {
    /// Exact number of rows in `table`, optionally restricted by `filter`.
    fn count(&self, table: &str, filter: Option<&Filter>) -> Result<u64, StoreError>;

    /// Columns of `table` in ordinal order, with type annotations when the
    /// store knows them. An unknown table is a `SchemaMismatch`.
    fn columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>, StoreError>;

    /// Rows `[offset, offset + limit)` of `table` in a stable order (by `id`).
    fn rows(&self, table: &str, offset: u64, limit: u64) -> Result<Vec<Row>, StoreError>;

    /// Inserts one record. Fields the record omits take the table defaults.
    fn insert(&self, table: &str, record: &Row) -> Result<(), StoreError>;

    /// Grouped counts of the values of `column`, ordered by value.
    fn distribution(&self, table: &str, column: &str) -> Result<Vec<(Value, u64)>, StoreError>;

    /// Short human-readable description of the backend, for the header line.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_on_equality() {
        let row = Row::new().with("night_use", "yes");
        assert!(Filter::eq("night_use", "yes").matches(&row));
        assert!(!Filter::eq("night_use", "no").matches(&row));
        assert!(!Filter::eq("missing", "yes").matches(&row));
        assert!(Filter::eq("missing", Value::Null).matches(&row));
    }

    #[test]
    fn store_error_display() {
        let e = StoreError::SchemaMismatch("table \"x\" not found".to_string());
        assert_eq!(e.to_string(), "schema mismatch: table \"x\" not found");
    }
}
