//! Configuration for table exports.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use parquet::basic::ZstdLevel;

use crate::error::{ExportError, Result};
use crate::schema::DateFormatConfig;

/// Default number of rows per record batch
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Default maximum number of rows per Parquet row group
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1_048_576;

/// Default ZSTD compression level
pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Root directory; files land in `<data_dir>/<schema>/<table>.parquet`
    pub data_dir: PathBuf,
    /// Rows per record batch handed to the writer
    pub batch_size: usize,
    /// Maximum rows per Parquet row group
    pub row_group_size: usize,
    /// ZSTD compression level (1-22)
    pub compression_level: i32,
    /// Worker threads used to coerce columns
    pub threads: usize,
    /// Export even when the output is already up to date
    pub force: bool,
    /// Show a progress spinner while rows are read
    pub show_progress: bool,
    /// Date format configuration for string-to-date conversions
    pub date_format_config: DateFormatConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            compression_level: DEFAULT_ZSTD_LEVEL,
            threads: num_cpus::get(),
            force: false,
            show_progress: true,
            date_format_config: DateFormatConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Config writing below `data_dir`, everything else default
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Build a configuration from environment variables
    ///
    /// Reads `DATA_DIR`, `PARQUET_BATCH_SIZE`, `PARQUET_ROW_GROUP_SIZE`,
    /// `PARQUET_ZSTD_LEVEL`, `WRDS_THREADS`, `WRDS_FORCE` and `WRDS_PROGRESS`.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = env_parse("PARQUET_BATCH_SIZE")? {
            config.batch_size = size;
        }
        if let Some(size) = env_parse("PARQUET_ROW_GROUP_SIZE")? {
            config.row_group_size = size;
        }
        if let Some(level) = env_parse("PARQUET_ZSTD_LEVEL")? {
            config.compression_level = level;
        }
        if let Some(threads) = env_parse("WRDS_THREADS")? {
            config.threads = threads;
        }
        if let Some(force) = env_flag("WRDS_FORCE")? {
            config.force = force;
        }
        if let Some(progress) = env_flag("WRDS_PROGRESS")? {
            config.show_progress = progress;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the writer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ExportError::Config("batch size must be positive".into()));
        }
        if self.row_group_size == 0 {
            return Err(ExportError::Config("row group size must be positive".into()));
        }
        if self.threads == 0 {
            return Err(ExportError::Config("thread count must be positive".into()));
        }
        ZstdLevel::try_new(self.compression_level).map_err(|e| {
            ExportError::Config(format!(
                "invalid ZSTD level {}: {e}",
                self.compression_level
            ))
        })?;
        Ok(())
    }
}

fn env_parse<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ExportError::Config(format!("{name}={raw:?}: {e}"))),
        Err(_) => Ok(None),
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ExportError::Config(format!(
                "{name}={raw:?}: expected a boolean"
            ))),
        },
        Err(_) => Ok(None),
    }
}
