//! Async wrappers around the blocking export
//!
//! Exports block on source reads and file writes, so inside a tokio runtime
//! they run on the blocking pool. Tables are still exported one at a time.

use std::sync::Arc;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::export::{ExportOutcome, wrds_to_parquet};
use crate::job::ExportJob;
use crate::source::TableSource;
use crate::table::TableDescriptor;

/// Export one table on tokio's blocking pool
pub async fn export_async(
    source: Arc<dyn TableSource>,
    descriptor: TableDescriptor,
    config: ExportConfig,
) -> Result<ExportOutcome> {
    tokio::task::spawn_blocking(move || wrds_to_parquet(source.as_ref(), &descriptor, &config))
        .await
        .map_err(|e| ExportError::Task(format!("Task join error: {e}")))?
}

/// Run a job's exports in order, each on the blocking pool
pub async fn run_job_async(
    source: Arc<dyn TableSource>,
    job: ExportJob,
    config: ExportConfig,
) -> Result<Vec<ExportOutcome>> {
    let mut outcomes = Vec::with_capacity(job.tables().len());
    for descriptor in job.into_tables() {
        outcomes.push(export_async(Arc::clone(&source), descriptor, config.clone()).await?);
    }
    Ok(outcomes)
}
