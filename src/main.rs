use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use log::info;
use wrds_parquet::job::crsp;
use wrds_parquet::{CsvDumpSource, ExportConfig, ExportJob, ExportOutcome};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ExportConfig::from_env().context("Invalid export configuration")?;

    let source_dir = env::var("WRDS_SOURCE_DIR")
        .map(PathBuf::from)
        .context("WRDS_SOURCE_DIR must point at the table dump directory")?;
    let source = CsvDumpSource::new(source_dir);

    let job = ExportJob::from_manifest_var("WRDS_JOB_FILE", env::var("WRDS_JOB_FILE"))
        .context("Failed to load job manifest")?
        .unwrap_or_else(crsp::monthly_job);

    info!(
        "Exporting {} tables from {} to {}",
        job.tables().len(),
        source.root().display(),
        config.data_dir.display()
    );

    let start = Instant::now();
    let outcomes = job.run(&source, &config)?;

    for outcome in &outcomes {
        match outcome {
            ExportOutcome::Exported(stats) => info!(
                "{}: {} rows, {} columns, {} bytes -> {}",
                stats.table,
                stats.rows,
                stats.columns,
                stats.bytes,
                stats.path.display()
            ),
            ExportOutcome::UpToDate { table, path } => {
                info!("{table}: up to date -> {}", path.display());
            }
        }
    }

    info!("Export run completed in {:?}", start.elapsed());
    Ok(())
}
