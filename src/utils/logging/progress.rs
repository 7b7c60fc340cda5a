//! Progress reporting utilities for long-running operations
//!
//! This module provides standardized progress reporting for table exports,
//! using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Default template for the row spinner
pub const DEFAULT_SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}";

/// Create a spinner counting rows for an export of unknown length
///
/// # Arguments
/// * `message` - Message to display with the spinner, usually the table name
/// * `enabled` - When false, a hidden bar is returned so callers can tick it unconditionally
///
/// # Returns
/// A configured spinner `ProgressBar`
#[must_use]
pub fn create_row_spinner(message: &str, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template(DEFAULT_SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());

    // Set reasonable tick rate
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Finish a spinner with an optional completion message
///
/// # Arguments
/// * `pb` - The `ProgressBar` to finish
/// * `message` - Optional completion message; without one the bar is cleared
pub fn finish_spinner(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish_and_clear();
    }
}
