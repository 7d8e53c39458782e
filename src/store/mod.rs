pub mod csv_file;
pub mod http;
pub mod memory;
pub mod postgres;

pub use csv_file::CsvFileStore;
pub use http::HttpTableStore;
pub use memory::MemoryStore;
pub use postgres::PgTableStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Table;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed table {table}: {reason}")]
    Malformed { table: String, reason: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Whole-table persistence keyed by logical table name.
///
/// Reads return every row; writes replace every row. There is no row-level
/// update, which is why callers batch mutations in a staging buffer.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when the table does not exist.
    async fn read_table(&self, name: &str) -> Result<Table, StoreError>;

    async fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError>;
}
