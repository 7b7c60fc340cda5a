//! CRSP tables pulled from WRDS.

use crate::job::ExportJob;
use crate::table::{ColumnType, TableDescriptor};

/// Source schema holding the CRSP tables
pub const CRSP_SCHEMA: &str = "crsp";

// SAS stores identifiers as doubles; these are written as 32-bit integers.
const INTEGER_IDS: [(&str, ColumnType); 2] = [
    ("permno", ColumnType::Integer),
    ("permco", ColumnType::Integer),
];

/// Delisting events
pub fn dsedelist() -> TableDescriptor {
    TableDescriptor::new("dsedelist", CRSP_SCHEMA)
        .fix_missing(true)
        .col_types(INTEGER_IDS)
}

/// Monthly stock events
pub fn mse() -> TableDescriptor {
    TableDescriptor::new("mse", CRSP_SCHEMA).fix_missing(true)
}

/// Monthly stock file
pub fn msf() -> TableDescriptor {
    TableDescriptor::new("msf", CRSP_SCHEMA)
        .fix_missing(true)
        .col_types(INTEGER_IDS)
}

/// The three monthly CRSP exports, in run order
pub fn monthly_job() -> ExportJob {
    ExportJob::new(vec![dsedelist(), mse(), msf()])
}
