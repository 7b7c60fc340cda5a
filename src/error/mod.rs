//! Error handling for table exports.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

use crate::table::ColumnType;

pub mod util;

/// Errors that can occur while exporting a table
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The source could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// The requested table does not exist in the source
    #[error("Table not found: {schema}.{table}")]
    TableNotFound { schema: String, table: String },

    /// A descriptor option names a column the table does not have
    #[error("Column {column} not found in {table}")]
    UnknownColumn { table: String, column: String },

    /// A value cannot be represented in the requested column type
    #[error("Cannot coerce {value:?} in column {column} (row {row}) to {target}")]
    Coercion {
        column: String,
        row: u64,
        value: String,
        target: ColumnType,
    },

    /// A column type tag outside the supported set
    #[error("Unknown column type: {0}")]
    UnknownType(String),

    /// The source returned data that does not match its own catalog
    #[error("Source error: {0}")]
    Source(String),

    /// Invalid export configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A background export task failed to complete
    #[error("Task error: {0}")]
    Task(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    /// Build a `TableNotFound` error
    pub fn table_not_found(schema: &str, table: &str) -> Self {
        Self::TableNotFound {
            schema: schema.to_string(),
            table: table.to_string(),
        }
    }

    /// Whether this error means the table does not exist in the source
    #[must_use]
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }

    /// Whether this error is a value coercion failure
    #[must_use]
    pub fn is_coercion(&self) -> bool {
        matches!(self, Self::Coercion { .. })
    }
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
