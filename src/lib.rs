//! A Rust library for exporting WRDS database tables to Parquet files, with
//! column type overrides and SAS missing-value repair.

pub mod async_io;
pub mod config;
pub mod error;
pub mod export;
pub mod job;
pub mod schema;
pub mod source;
pub mod table;
pub mod utils;
pub mod writer;

// Re-export the most common types for easier use
// Core types
pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use export::{ExportOutcome, ExportStats, wrds_to_parquet};
pub use job::ExportJob;
pub use table::{ColumnType, TableDescriptor};

// Sources
pub use source::{CsvDumpSource, InMemorySource, SourceColumn, TableInfo, TableSource};

// Async functionality
pub use async_io::{export_async, run_job_async};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;
