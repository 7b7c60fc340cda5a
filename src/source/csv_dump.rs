//! Table dumps on disk.
//!
//! Layout below the root directory:
//!
//! ```text
//! <root>/<schema>/<table>.csv   header row plus data rows
//! <root>/<schema>/<table>.json  {"columns": [{"name": .., "type": ..}], "last_modified": ..}
//! ```
//!
//! The catalog carries the source-inferred column types, which CSV alone
//! cannot express.

use std::fs::File;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::util::{safe_read_to_string, validate_directory};
use crate::error::{ExportError, Result};
use crate::source::{RawRow, RowStream, SourceColumn, TableInfo, TableSource};

/// Column catalog stored next to each dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub columns: Vec<SourceColumn>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// A source backed by a directory of CSV dumps
#[derive(Debug, Clone)]
pub struct CsvDumpSource {
    root: PathBuf,
}

impl CsvDumpSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn csv_path(&self, schema: &str, table: &str) -> PathBuf {
        self.root.join(schema).join(format!("{table}.csv"))
    }

    fn catalog_path(&self, schema: &str, table: &str) -> PathBuf {
        self.root.join(schema).join(format!("{table}.json"))
    }

    fn ensure_reachable(&self) -> Result<()> {
        validate_directory(&self.root, "table dumps")
            .map_err(|e| ExportError::Connection(format!("{}: {e}", self.root.display())))
    }
}

impl TableSource for CsvDumpSource {
    fn source_name(&self) -> &str {
        "csv-dump"
    }

    fn describe(&self, schema: &str, table: &str) -> Result<TableInfo> {
        self.ensure_reachable()?;

        if !self.csv_path(schema, table).is_file() {
            return Err(ExportError::table_not_found(schema, table));
        }

        let catalog_path = self.catalog_path(schema, table);
        let raw = safe_read_to_string(&catalog_path, "column catalog").map_err(|e| {
            ExportError::Source(format!("missing catalog for {schema}.{table}: {e}"))
        })?;
        let catalog: Catalog = serde_json::from_str(&raw).map_err(|e| {
            ExportError::Source(format!(
                "invalid catalog {}: {e}",
                catalog_path.display()
            ))
        })?;

        if catalog.columns.is_empty() {
            return Err(ExportError::Source(format!(
                "catalog for {schema}.{table} lists no columns"
            )));
        }
        if let Some(dup) = catalog.columns.iter().map(|c| &c.name).duplicates().next() {
            return Err(ExportError::Source(format!(
                "catalog for {schema}.{table} lists column {dup} twice"
            )));
        }

        Ok(TableInfo {
            schema: schema.to_string(),
            table: table.to_string(),
            columns: catalog.columns,
            last_modified: catalog.last_modified,
        })
    }

    fn read_rows<'a>(&'a self, info: &TableInfo, limit: Option<usize>) -> Result<RowStream<'a>> {
        let path = self.csv_path(&info.schema, &info.table);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExportError::table_not_found(&info.schema, &info.table)
            } else {
                ExportError::Io(e)
            }
        })?;

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let header = reader.headers()?.clone();
        let expected = info.columns.iter().map(|c| c.name.as_str());
        if !header.iter().eq(expected) {
            return Err(ExportError::Source(format!(
                "header of {} does not match catalog: [{}] vs [{}]",
                path.display(),
                header.iter().join(", "),
                info.columns.iter().map(|c| &c.name).join(", ")
            )));
        }

        let rows = reader.into_records().map(|record| -> Result<RawRow> {
            let record = record?;
            Ok(record
                .iter()
                .map(|value| Some(value.to_string()))
                .collect::<RawRow>())
        });

        match limit {
            Some(n) => Ok(Box::new(rows.take(n))),
            None => Ok(Box::new(rows)),
        }
    }
}
