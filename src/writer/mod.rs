//! Parquet output
//!
//! Writes one table to `<data_dir>/<schema>/<name>.parquet`. Data goes to a
//! hidden temporary file in the same directory first and is renamed over the
//! target only once the footer is written, so readers never see a partial
//! file and a failed export leaves the previous file in place.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::format::KeyValue;

use crate::config::ExportConfig;
use crate::error::util::remove_if_exists;
use crate::error::{ExportError, Result};
use crate::table::TableDescriptor;
use crate::utils::logging::log_warning;

/// Key-value metadata entry holding the source's modification stamp
pub const LAST_MODIFIED_KEY: &str = "last_modified";

/// Final location of a table's Parquet file
#[must_use]
pub fn output_path(data_dir: &Path, descriptor: &TableDescriptor) -> PathBuf {
    data_dir
        .join(descriptor.schema())
        .join(format!("{}.parquet", descriptor.output_stem()))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Build Parquet writer properties with ZSTD compression and column statistics.
pub fn writer_properties(
    config: &ExportConfig,
    last_modified: Option<&str>,
) -> Result<WriterProperties> {
    let zstd_level = ZstdLevel::try_new(config.compression_level).map_err(|e| {
        ExportError::Config(format!(
            "invalid ZSTD level {}: {e}",
            config.compression_level
        ))
    })?;

    let metadata = last_modified
        .map(|stamp| vec![KeyValue::new(LAST_MODIFIED_KEY.to_string(), stamp.to_string())]);

    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(zstd_level))
        .set_statistics_enabled(EnabledStatistics::Chunk)
        .set_max_row_group_size(config.row_group_size)
        .set_key_value_metadata(metadata)
        .build())
}

/// Read the modification stamp stored in an existing output file
///
/// Returns `Ok(None)` when the file does not exist or carries no stamp.
pub fn read_last_modified(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let reader = SerializedFileReader::new(File::open(path)?)?;
    let stamp = reader
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|entries| {
            entries
                .iter()
                .find(|kv| kv.key == LAST_MODIFIED_KEY)
                .and_then(|kv| kv.value.clone())
        });
    Ok(stamp)
}

// Cleanup failures are logged, not returned
fn discard_temp(tmp_path: &Path) {
    if let Err(e) = remove_if_exists(tmp_path) {
        log_warning(
            &format!("Failed to remove partial file ({e})"),
            Some(&tmp_path.display()),
        );
    }
}

/// Summary of a finished file
#[derive(Debug, Clone)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
}

/// Streaming writer for one table's Parquet file
pub struct ParquetTableWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: ArrowWriter<File>,
    rows: u64,
}

impl ParquetTableWriter {
    /// Open a writer that will replace `path` on `finish`
    pub fn create(path: &Path, schema: SchemaRef, props: WriterProperties) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let tmp_path = temp_path(path);
        let file = File::create(&tmp_path)?;
        let writer = match ArrowWriter::try_new(file, schema, Some(props)) {
            Ok(writer) => writer,
            Err(e) => {
                discard_temp(&tmp_path);
                return Err(e.into());
            }
        };

        debug!("Writing {} via {}", path.display(), tmp_path.display());
        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer,
            rows: 0,
        })
    }

    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        self.rows += batch.num_rows() as u64;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Write the footer and move the file into place
    pub fn finish(self) -> Result<WriteSummary> {
        let Self {
            path,
            tmp_path,
            writer,
            rows,
        } = self;

        let finished = writer
            .into_inner()
            .map_err(ExportError::from)
            .and_then(|file| file.sync_all().map_err(ExportError::from));
        if let Err(e) = finished {
            discard_temp(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &path) {
            discard_temp(&tmp_path);
            return Err(e.into());
        }
        let bytes = fs::metadata(&path)?.len();

        Ok(WriteSummary { path, rows, bytes })
    }

    /// Discard the partial file, leaving any previous output untouched
    pub fn abort(self) -> Result<()> {
        let Self {
            tmp_path, writer, ..
        } = self;
        drop(writer);
        remove_if_exists(&tmp_path)
    }
}
