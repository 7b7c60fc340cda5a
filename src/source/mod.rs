//! Table sources
//!
//! A `TableSource` is the boundary to the database the tables live in. It
//! answers two questions: what does a table look like (`describe`), and what
//! rows does it hold (`read_rows`). Values arrive as raw text, the way the
//! WRDS export stream delivers them; typing happens on this side.
//!
//! Available sources:
//! - `CsvDumpSource`: a directory of `<schema>/<table>.csv` dumps with JSON catalogs
//! - `InMemorySource`: tables held in memory

pub mod csv_dump;
pub mod memory;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::ColumnType;

pub use csv_dump::CsvDumpSource;
pub use memory::InMemorySource;

/// A raw row: one optional text value per catalog column
pub type RawRow = Vec<Option<String>>;

/// Stream of raw rows from a source
pub type RowStream<'a> = Box<dyn Iterator<Item = Result<RawRow>> + Send + 'a>;

/// A column as the source describes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl SourceColumn {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// What a source reports about a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub schema: String,
    pub table: String,
    /// Columns in source order
    pub columns: Vec<SourceColumn>,
    /// Source-side modification stamp, if the source keeps one
    pub last_modified: Option<String>,
}

impl TableInfo {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, columns: Vec<SourceColumn>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            columns,
            last_modified: None,
        }
    }

    #[must_use]
    pub fn with_last_modified(mut self, stamp: impl Into<String>) -> Self {
        self.last_modified = Some(stamp.into());
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Base trait for table sources
pub trait TableSource: Send + Sync {
    /// Short name for log lines
    fn source_name(&self) -> &str;

    /// Resolve a table and describe its columns
    ///
    /// Fails with `ExportError::TableNotFound` when the table does not exist
    /// and `ExportError::Connection` when the source cannot be reached.
    fn describe(&self, schema: &str, table: &str) -> Result<TableInfo>;

    /// Stream the rows of a described table, at most `limit` of them
    fn read_rows<'a>(&'a self, info: &TableInfo, limit: Option<usize>) -> Result<RowStream<'a>>;
}
