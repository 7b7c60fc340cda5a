//! The table export operation.
//!
//! `wrds_to_parquet` resolves a table in a source, reads its rows, repairs
//! missing values, coerces columns to their planned types and writes the
//! result to `<data_dir>/<schema>/<table>.parquet`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;
use indicatif::ProgressBar;
use log::info;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::schema::{ExportPlan, coerce_column, plan_columns, repair_value};
use crate::source::{TableInfo, TableSource};
use crate::table::TableDescriptor;
use crate::utils::logging::{
    create_row_spinner, finish_spinner, log_operation_complete, log_operation_start, log_warning,
};
use crate::writer::{ParquetTableWriter, output_path, read_last_modified, writer_properties};

/// Statistics from a completed export
#[derive(Debug, Clone)]
pub struct ExportStats {
    /// `schema.table`
    pub table: String,
    pub path: PathBuf,
    pub rows: u64,
    pub columns: usize,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// What an export call did
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    /// The file was (re)written
    Exported(ExportStats),
    /// The existing file already matches the source's modification stamp
    UpToDate { table: String, path: PathBuf },
}

impl ExportOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Exported(stats) => &stats.path,
            Self::UpToDate { path, .. } => path,
        }
    }

    #[must_use]
    pub fn was_exported(&self) -> bool {
        matches!(self, Self::Exported(_))
    }
}

/// Export one table from `source` to a Parquet file
///
/// # Arguments
/// * `source` - Where the table lives
/// * `descriptor` - Table name, source schema, missing-value and type options
/// * `config` - Output directory, batch sizes, compression
///
/// # Errors
/// `Connection` when the source is unreachable, `TableNotFound` for an
/// unknown table, `UnknownColumn` when an option names a missing column,
/// `Coercion` when a value does not fit its target type. On any error the
/// previous output file, if there is one, is left as it was.
pub fn wrds_to_parquet(
    source: &dyn TableSource,
    descriptor: &TableDescriptor,
    config: &ExportConfig,
) -> Result<ExportOutcome> {
    config.validate()?;
    descriptor.validate()?;

    let start = Instant::now();
    let table = descriptor.qualified_name();
    log_operation_start(&format!("Exporting from {}", source.source_name()), &table);

    let info = source.describe(descriptor.schema(), descriptor.table())?;
    let plan = plan_columns(&info, descriptor)?;
    let path = output_path(&config.data_dir, descriptor);

    if !config.force && is_up_to_date(&info, &path) {
        info!("{table} is up to date in {}", path.display());
        return Ok(ExportOutcome::UpToDate { table, path });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| ExportError::Config(format!("cannot start worker threads: {e}")))?;
    let props = writer_properties(config, info.last_modified.as_deref())?;
    let mut writer = ParquetTableWriter::create(&path, plan.schema.clone(), props)?;
    let spinner = create_row_spinner(&table, config.show_progress);

    let streamed = stream_rows(
        source,
        &info,
        descriptor,
        &plan,
        config,
        &pool,
        &mut writer,
        &spinner,
    );
    finish_spinner(&spinner, None);

    if let Err(e) = streamed {
        if let Err(cleanup) = writer.abort() {
            log_warning(
                &format!("Failed to remove partial file ({cleanup})"),
                Some(&path.display()),
            );
        }
        return Err(e);
    }

    let summary = writer.finish()?;
    let elapsed = start.elapsed();
    log_operation_complete("exported", &table, summary.rows, Some(elapsed));

    Ok(ExportOutcome::Exported(ExportStats {
        table,
        path: summary.path,
        rows: summary.rows,
        columns: plan.columns.len(),
        bytes: summary.bytes,
        elapsed,
    }))
}

fn is_up_to_date(info: &TableInfo, path: &Path) -> bool {
    let Some(stamp) = info.last_modified.as_deref() else {
        return false;
    };

    match read_last_modified(path) {
        Ok(Some(existing)) => existing == stamp,
        Ok(None) => false,
        Err(e) => {
            log_warning(
                &format!("Cannot read modification stamp ({e}), exporting again"),
                Some(&path.display()),
            );
            false
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn stream_rows(
    source: &dyn TableSource,
    info: &TableInfo,
    descriptor: &TableDescriptor,
    plan: &ExportPlan,
    config: &ExportConfig,
    pool: &ThreadPool,
    writer: &mut ParquetTableWriter,
    spinner: &ProgressBar,
) -> Result<()> {
    let width = info.columns.len();
    let fix_missing = descriptor.is_fix_missing();
    let fix_cr = descriptor.is_fix_cr();

    let mut buffers: Vec<Vec<Option<String>>> = plan
        .columns
        .iter()
        .map(|_| Vec::with_capacity(config.batch_size))
        .collect();
    let mut first_row: u64 = 0;
    let mut buffered: usize = 0;

    for row in source.read_rows(info, descriptor.row_limit())? {
        let mut row = row?;
        if row.len() != width {
            return Err(ExportError::Source(format!(
                "row {} of {} has {} values, expected {width}",
                first_row + buffered as u64,
                info.qualified_name(),
                row.len()
            )));
        }

        for (column, buffer) in plan.columns.iter().zip(buffers.iter_mut()) {
            let value = row[column.source_index].take();
            buffer.push(repair_value(
                value,
                column.source_type.stores_numeric(),
                fix_missing,
                fix_cr,
            ));
        }
        buffered += 1;

        if buffered == config.batch_size {
            let batch = build_batch(plan, &mut buffers, first_row, config, pool)?;
            writer.write(&batch)?;
            first_row += buffered as u64;
            buffered = 0;
            spinner.set_position(writer.rows_written());
        }
    }

    if buffered > 0 {
        let batch = build_batch(plan, &mut buffers, first_row, config, pool)?;
        writer.write(&batch)?;
        spinner.set_position(writer.rows_written());
    }

    Ok(())
}

/// Coerce the buffered columns in parallel and empty the buffers
fn build_batch(
    plan: &ExportPlan,
    buffers: &mut [Vec<Option<String>>],
    first_row: u64,
    config: &ExportConfig,
    pool: &ThreadPool,
) -> Result<RecordBatch> {
    let arrays = pool.install(|| {
        plan.columns
            .par_iter()
            .zip(buffers.par_iter())
            .map(|(column, values)| {
                coerce_column(
                    values,
                    column.target_type,
                    &column.output_name,
                    first_row,
                    &config.date_format_config,
                )
            })
            .collect::<Result<Vec<ArrayRef>>>()
    })?;

    buffers.iter_mut().for_each(Vec::clear);
    Ok(RecordBatch::try_new(plan.schema.clone(), arrays)?)
}
