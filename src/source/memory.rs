//! In-memory tables.

use rustc_hash::FxHashMap;

use crate::error::{ExportError, Result};
use crate::source::{RawRow, RowStream, TableInfo, TableSource};

/// A source holding its tables in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    tables: FxHashMap<(String, String), (TableInfo, Vec<RawRow>)>,
    offline: bool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that cannot be reached; every call fails with a connection error
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Add or replace a table
    #[must_use]
    pub fn with_table(mut self, info: TableInfo, rows: Vec<RawRow>) -> Self {
        self.insert(info, rows);
        self
    }

    pub fn insert(&mut self, info: TableInfo, rows: Vec<RawRow>) {
        let key = (info.schema.clone(), info.table.clone());
        self.tables.insert(key, (info, rows));
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(ExportError::Connection("in-memory source is offline".into()));
        }
        Ok(())
    }

    fn lookup(&self, schema: &str, table: &str) -> Result<&(TableInfo, Vec<RawRow>)> {
        self.tables
            .get(&(schema.to_string(), table.to_string()))
            .ok_or_else(|| ExportError::table_not_found(schema, table))
    }
}

impl TableSource for InMemorySource {
    fn source_name(&self) -> &str {
        "memory"
    }

    fn describe(&self, schema: &str, table: &str) -> Result<TableInfo> {
        self.check_online()?;
        Ok(self.lookup(schema, table)?.0.clone())
    }

    fn read_rows<'a>(&'a self, info: &TableInfo, limit: Option<usize>) -> Result<RowStream<'a>> {
        self.check_online()?;
        let (stored, rows) = self.lookup(&info.schema, &info.table)?;
        let width = stored.columns.len();
        let qualified = stored.qualified_name();

        let stream = rows
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(move |(i, row)| {
                if row.len() == width {
                    Ok(row.clone())
                } else {
                    Err(ExportError::Source(format!(
                        "row {i} of {qualified} has {} values, expected {width}",
                        row.len()
                    )))
                }
            });
        Ok(Box::new(stream))
    }
}
