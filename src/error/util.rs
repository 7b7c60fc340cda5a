//! Utility functions for error handling
//!
//! Helpers that turn filesystem failures into errors that say what the
//! file was needed for.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ExportError, Result};

/// Check that a directory exists and is readable
///
/// # Arguments
/// * `path` - The directory to check
/// * `purpose` - Why the directory is needed (for error context)
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(ExportError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Directory not found: {} (needed for {purpose})", path.display()),
        )));
    }

    fs::read_dir(path).map(|_| ()).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check directory permissions".to_string()
            }
            _ => format!("Failed to access directory for {purpose}"),
        };
        ExportError::Io(io::Error::new(
            e.kind(),
            format!("{context}: {}: {e}", path.display()),
        ))
    })
}

/// Read a file to string, naming the file and its purpose on failure
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::NotFound => "File not found".to_string(),
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            io::ErrorKind::InvalidData => {
                "File contains invalid UTF-8 data - cannot read as text".to_string()
            }
            _ => format!("Failed to read file for {purpose}"),
        };
        ExportError::Io(io::Error::new(
            e.kind(),
            format!("{context}: {}", path.display()),
        ))
    })
}

/// Remove a file if it exists, ignoring a missing file
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
