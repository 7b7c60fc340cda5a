//! Module for converting raw text columns to typed Arrow arrays.

use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, StringArray, TimestampMicrosecondArray,
};

use crate::error::{ExportError, Result};
use crate::schema::date_utils::{
    DateFormatConfig, days_since_epoch, parse_date_string, parse_timestamp_string,
};
use crate::table::ColumnType;

/// Parse an integer literal, accepting floats with no fractional part.
///
/// `"42"`, `"42.0"` and `"4.2e1"` all give 42; `"42.5"` gives `None`.
#[must_use]
pub fn parse_integer(s: &str) -> Option<i64> {
    let t = s.trim();
    if let Ok(v) = t.parse::<i64>() {
        return Some(v);
    }

    let f = t.parse::<f64>().ok()?;
    let in_range = (i64::MIN as f64..i64::MAX as f64).contains(&f);
    if f.is_finite() && f.fract() == 0.0 && in_range {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a finite float; literals that overflow the target width give `None`
fn parse_float<T>(s: &str) -> Option<T>
where
    T: FromStr + Into<f64> + Copy,
{
    let v = s.trim().parse::<T>().ok()?;
    v.into().is_finite().then_some(v)
}

/// Parse a boolean flag
#[must_use]
pub fn parse_boolean(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" => Some(true),
        "f" | "false" | "n" | "no" => Some(false),
        other => match parse_integer(other)? {
            1 => Some(true),
            0 => Some(false),
            _ => None,
        },
    }
}

/// Convert one column of raw values to an Arrow array of `target` type
///
/// # Arguments
/// * `values` - Raw values, already repaired; `None` is null
/// * `target` - The column type to produce
/// * `column` - Output column name, for errors
/// * `first_row` - Row number of `values[0]` within the table, for errors
/// * `date_config` - Accepted date and timestamp formats
///
/// # Errors
/// `ExportError::Coercion` for the first value that cannot be represented
/// in `target`.
pub fn coerce_column(
    values: &[Option<String>],
    target: ColumnType,
    column: &str,
    first_row: u64,
    date_config: &DateFormatConfig,
) -> Result<ArrayRef> {
    let array: ArrayRef = match target {
        ColumnType::SmallInt => {
            let parsed = coerce_values(values, target, column, first_row, |s| {
                parse_integer(s).and_then(|v| i16::try_from(v).ok())
            })?;
            Arc::new(Int16Array::from(parsed))
        }
        ColumnType::Integer => {
            let parsed = coerce_values(values, target, column, first_row, |s| {
                parse_integer(s).and_then(|v| i32::try_from(v).ok())
            })?;
            Arc::new(Int32Array::from(parsed))
        }
        ColumnType::BigInt => {
            let parsed = coerce_values(values, target, column, first_row, parse_integer)?;
            Arc::new(Int64Array::from(parsed))
        }
        ColumnType::Real => {
            let parsed = coerce_values(values, target, column, first_row, parse_float::<f32>)?;
            Arc::new(Float32Array::from(parsed))
        }
        ColumnType::Double => {
            let parsed = coerce_values(values, target, column, first_row, parse_float::<f64>)?;
            Arc::new(Float64Array::from(parsed))
        }
        ColumnType::Text => Arc::new(values.iter().map(Option::as_deref).collect::<StringArray>()),
        ColumnType::Date => {
            let parsed = coerce_values(values, target, column, first_row, |s| {
                parse_date_string(s, date_config)
                    .and_then(|date| i32::try_from(days_since_epoch(date)).ok())
            })?;
            Arc::new(Date32Array::from(parsed))
        }
        ColumnType::Timestamp => {
            let parsed = coerce_values(values, target, column, first_row, |s| {
                parse_timestamp_string(s, date_config).map(|ts| ts.and_utc().timestamp_micros())
            })?;
            Arc::new(TimestampMicrosecondArray::from(parsed))
        }
        ColumnType::Boolean => {
            let parsed = coerce_values(values, target, column, first_row, parse_boolean)?;
            Arc::new(BooleanArray::from(parsed))
        }
    };

    Ok(array)
}

fn coerce_values<T, F>(
    values: &[Option<String>],
    target: ColumnType,
    column: &str,
    first_row: u64,
    parse: F,
) -> Result<Vec<Option<T>>>
where
    F: Fn(&str) -> Option<T>,
{
    values
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            None => Ok(None),
            Some(raw) => parse(raw).map(Some).ok_or_else(|| ExportError::Coercion {
                column: column.to_string(),
                row: first_row + i as u64,
                value: raw.clone(),
                target,
            }),
        })
        .collect()
}
