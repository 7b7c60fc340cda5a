//! Module for handling date and timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Configuration for date format handling
#[derive(Debug, Clone)]
pub struct DateFormatConfig {
    /// Date format strings tried in order
    pub date_formats: Vec<String>,
    /// Timestamp format strings tried in order
    pub timestamp_formats: Vec<String>,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2023-01-15
                "%Y%m%d".to_string(),   // Compact: 20230115
                "%d%b%Y".to_string(),   // SAS DATE9: 15JAN2023
                "%m/%d/%Y".to_string(), // US: 01/15/2023
            ],
            timestamp_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%d%b%Y:%H:%M:%S%.f".to_string(), // SAS DATETIME: 15JAN2023:09:30:00
            ],
            enable_format_detection: true,
        }
    }
}

/// Days between the Unix epoch and `date`
#[must_use]
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    date.signed_duration_since(DateTime::UNIX_EPOCH.date_naive())
        .num_days()
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let s = s.trim();
    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    if config.enable_format_detection {
        if let Some(detected_format) = detect_date_format(s) {
            if let Ok(date) = NaiveDate::parse_from_str(s, detected_format) {
                return Some(date);
            }
        }
    }

    None
}

/// Parse a timestamp string; a bare date is read as midnight
#[must_use]
pub fn parse_timestamp_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in &config.timestamp_formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }

    parse_date_string(s, config).and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    // YYYY/MM/DD
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 3 && parts[0].len() == 4 {
        return Some("%Y/%m/%d");
    }

    // DD.MM.YYYY
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() == 3 && parts[2].len() == 4 {
        return Some("%d.%m.%Y");
    }

    None
}
