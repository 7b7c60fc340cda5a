//! Output schema planning, missing-value repair and type coercion.
//!
//! `plan_columns` decides which source columns are exported, under which
//! names, and with which types. The submodules then do the per-value work:
//! `missing` repairs SAS missing values, `conversions` turns the repaired
//! text into typed Arrow arrays.

pub mod conversions;
pub mod date_utils;
pub mod missing;

use std::sync::Arc;

use arrow::datatypes::{Field, Schema, SchemaRef};
use log::debug;
use rustc_hash::FxHashSet;

use crate::error::{ExportError, Result};
use crate::source::TableInfo;
use crate::table::{ColumnType, TableDescriptor};

pub use conversions::{coerce_column, parse_integer};
pub use date_utils::DateFormatConfig;
pub use missing::{is_special_missing, repair_value};

/// How one source column becomes one output column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Position of the column in source rows
    pub source_index: usize,
    pub source_name: String,
    pub output_name: String,
    /// Type reported by the source; decides missing-value handling
    pub source_type: ColumnType,
    /// Type written to the output file
    pub target_type: ColumnType,
}

impl ColumnPlan {
    /// Whether the column is coerced away from its source type
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        self.source_type != self.target_type
    }
}

/// The full set of output columns and their Arrow schema
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub columns: Vec<ColumnPlan>,
    pub schema: SchemaRef,
}

/// Plan the output columns of `info` as shaped by `descriptor`
///
/// Applies `keep`, then `drop`, then `rename`, then the type overrides.
/// Every column named by those options must exist in the table.
pub fn plan_columns(info: &TableInfo, descriptor: &TableDescriptor) -> Result<ExportPlan> {
    let table = info.qualified_name();
    let unknown = |column: &str| ExportError::UnknownColumn {
        table: table.clone(),
        column: column.to_string(),
    };

    let named = descriptor
        .kept_columns()
        .into_iter()
        .flatten()
        .chain(descriptor.dropped_columns())
        .chain(descriptor.renames().keys())
        .chain(descriptor.col_type_overrides().keys());
    for column in named {
        if info.column_index(column).is_none() {
            return Err(unknown(column));
        }
    }

    let kept: Option<FxHashSet<&str>> = descriptor
        .kept_columns()
        .map(|cols| cols.iter().map(String::as_str).collect());
    let dropped: FxHashSet<&str> = descriptor
        .dropped_columns()
        .iter()
        .map(String::as_str)
        .collect();

    let columns: Vec<ColumnPlan> = info
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| kept.as_ref().is_none_or(|k| k.contains(c.name.as_str())))
        .filter(|(_, c)| !dropped.contains(c.name.as_str()))
        .map(|(source_index, c)| ColumnPlan {
            source_index,
            source_name: c.name.clone(),
            output_name: descriptor
                .renames()
                .get(&c.name)
                .cloned()
                .unwrap_or_else(|| c.name.clone()),
            source_type: c.column_type,
            target_type: descriptor.override_for(&c.name).unwrap_or(c.column_type),
        })
        .collect();

    if columns.is_empty() {
        return Err(ExportError::Config(format!(
            "no columns left to export from {table}"
        )));
    }

    let mut seen = FxHashSet::default();
    for plan in &columns {
        if !seen.insert(plan.output_name.as_str()) {
            return Err(ExportError::Config(format!(
                "output column {} appears twice in {table}",
                plan.output_name
            )));
        }
        if plan.is_overridden() {
            debug!(
                "{table}.{}: {} -> {}",
                plan.source_name, plan.source_type, plan.target_type
            );
        }
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(&c.output_name, c.target_type.arrow_type(), true))
        .collect();

    Ok(ExportPlan {
        columns,
        schema: Arc::new(Schema::new(fields)),
    })
}
