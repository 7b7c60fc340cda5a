//! Export jobs: ordered lists of tables exported one after another.

pub mod crsp;

use std::env::VarError;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::ExportConfig;
use crate::error::util::safe_read_to_string;
use crate::error::{ExportError, Result};
use crate::export::{ExportOutcome, wrds_to_parquet};
use crate::source::TableSource;
use crate::table::TableDescriptor;

/// An ordered list of table exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    tables: Vec<TableDescriptor>,
}

impl ExportJob {
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self { tables }
    }

    /// Load a job from a JSON manifest
    ///
    /// ```json
    /// {"tables": [{"table": "msf", "schema": "crsp", "fix_missing": true,
    ///              "col_types": {"permno": "integer"}}]}
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = safe_read_to_string(path, "export job manifest")?;
        let job: Self = serde_json::from_str(&raw)?;
        if job.tables.is_empty() {
            return Err(ExportError::Config(format!(
                "job manifest {} lists no tables",
                path.display()
            )));
        }
        Ok(job)
    }

    /// Load the manifest named by an environment lookup, if one is set
    ///
    /// An unset variable gives `Ok(None)`; a value that is not valid
    /// Unicode is a configuration error rather than a silent fallback.
    pub fn from_manifest_var(
        name: &str,
        value: std::result::Result<String, VarError>,
    ) -> Result<Option<Self>> {
        match value {
            Ok(manifest) => Self::from_json_file(Path::new(&manifest)).map(Some),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(ExportError::Config(format!(
                "{name}={raw:?} is not a valid path"
            ))),
        }
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn into_tables(self) -> Vec<TableDescriptor> {
        self.tables
    }

    /// Export every table in order, stopping at the first error
    pub fn run(&self, source: &dyn TableSource, config: &ExportConfig) -> Result<Vec<ExportOutcome>> {
        let mut outcomes = Vec::with_capacity(self.tables.len());
        for (i, descriptor) in self.tables.iter().enumerate() {
            info!(
                "[{}/{}] {}",
                i + 1,
                self.tables.len(),
                descriptor.qualified_name()
            );
            outcomes.push(wrds_to_parquet(source, descriptor, config)?);
        }
        Ok(outcomes)
    }
}
