//! Table descriptors: which table to export and how.
//!
//! A `TableDescriptor` carries everything one export call needs to know about
//! a table: its name, the source schema it lives in, whether SAS missing
//! values should be repaired, and which columns need an explicit type. It is
//! built once per call site with consuming builder methods and not changed
//! afterwards.
//!
//! ```
//! use wrds_parquet::{ColumnType, TableDescriptor};
//!
//! let msf = TableDescriptor::new("msf", "crsp")
//!     .fix_missing(true)
//!     .col_type("permno", ColumnType::Integer)
//!     .col_type("permco", ColumnType::Integer);
//!
//! assert_eq!(msf.qualified_name(), "crsp.msf");
//! assert_eq!(msf.override_for("permno"), Some(ColumnType::Integer));
//! ```

pub mod types;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

pub use types::ColumnType;

/// Description of a single table export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    table: String,
    schema: String,
    #[serde(default)]
    fix_missing: bool,
    #[serde(default)]
    fix_cr: bool,
    #[serde(default)]
    col_types: FxHashMap<String, ColumnType>,
    #[serde(default)]
    keep: Option<Vec<String>>,
    #[serde(default)]
    drop: Vec<String>,
    #[serde(default)]
    rename: FxHashMap<String, String>,
    #[serde(default)]
    obs: Option<usize>,
    #[serde(default)]
    alt_table_name: Option<String>,
}

impl TableDescriptor {
    /// Describe `table` in the source schema `schema` with default options
    pub fn new(table: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            schema: schema.into(),
            fix_missing: false,
            fix_cr: false,
            col_types: FxHashMap::default(),
            keep: None,
            drop: Vec::new(),
            rename: FxHashMap::default(),
            obs: None,
            alt_table_name: None,
        }
    }

    /// Replace SAS special missing values with nulls before typing
    #[must_use]
    pub fn fix_missing(mut self, enabled: bool) -> Self {
        self.fix_missing = enabled;
        self
    }

    /// Replace carriage returns and line feeds in text values with spaces
    #[must_use]
    pub fn fix_cr(mut self, enabled: bool) -> Self {
        self.fix_cr = enabled;
        self
    }

    /// Coerce `column` to `column_type` instead of its source type
    #[must_use]
    pub fn col_type(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.col_types.insert(column.into(), column_type);
        self
    }

    /// Add several overrides at once
    #[must_use]
    pub fn col_types<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, ColumnType)>,
        K: Into<String>,
    {
        self.col_types
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Export only these columns, in source order
    #[must_use]
    pub fn keep<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Leave these columns out of the export
    #[must_use]
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Write `from` under the name `to`
    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    /// Export at most `rows` rows
    #[must_use]
    pub fn obs(mut self, rows: usize) -> Self {
        self.obs = Some(rows);
        self
    }

    /// Name the output file after `name` instead of the table
    #[must_use]
    pub fn alt_table_name(mut self, name: impl Into<String>) -> Self {
        self.alt_table_name = Some(name.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// `schema.table`, used in log lines and errors
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Stem of the output file name
    pub fn output_stem(&self) -> &str {
        self.alt_table_name.as_deref().unwrap_or(&self.table)
    }

    pub fn is_fix_missing(&self) -> bool {
        self.fix_missing
    }

    pub fn is_fix_cr(&self) -> bool {
        self.fix_cr
    }

    pub fn col_type_overrides(&self) -> &FxHashMap<String, ColumnType> {
        &self.col_types
    }

    pub fn override_for(&self, column: &str) -> Option<ColumnType> {
        self.col_types.get(column).copied()
    }

    pub fn kept_columns(&self) -> Option<&[String]> {
        self.keep.as_deref()
    }

    pub fn dropped_columns(&self) -> &[String] {
        &self.drop
    }

    pub fn renames(&self) -> &FxHashMap<String, String> {
        &self.rename
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.obs
    }

    /// Check the names before any source is contacted
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(ExportError::Config("table name must not be empty".into()));
        }
        if self.schema.trim().is_empty() {
            return Err(ExportError::Config(format!(
                "source schema for table {} must not be empty",
                self.table
            )));
        }
        if let Some(stem) = &self.alt_table_name {
            if stem.trim().is_empty() || stem.contains(['/', '\\']) {
                return Err(ExportError::Config(format!(
                    "invalid output name {stem:?} for {}",
                    self.qualified_name()
                )));
            }
        }
        if self.table.contains(['/', '\\']) || self.schema.contains(['/', '\\']) {
            return Err(ExportError::Config(format!(
                "path separators are not allowed in {}",
                self.qualified_name()
            )));
        }
        Ok(())
    }
}
