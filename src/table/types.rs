//! Column type tags accepted in `col_types` overrides and source catalogs.

use std::fmt;
use std::str::FromStr;

use arrow::datatypes::{DataType, TimeUnit};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// The scalar types a column can be coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    /// 16-bit signed integer
    SmallInt,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit float
    Real,
    /// 64-bit float
    Double,
    /// UTF-8 text
    Text,
    /// Calendar date
    Date,
    /// Timestamp without time zone, microsecond precision
    Timestamp,
    /// Boolean
    Boolean,
}

impl ColumnType {
    /// Canonical tag, as written in `col_types`
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::SmallInt => "smallint",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Real => "real",
            Self::Double => "double",
            Self::Text => "text",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Boolean => "boolean",
        }
    }

    /// Arrow type used for the output column
    #[must_use]
    pub fn arrow_type(self) -> DataType {
        match self {
            Self::SmallInt => DataType::Int16,
            Self::Integer => DataType::Int32,
            Self::BigInt => DataType::Int64,
            Self::Real => DataType::Float32,
            Self::Double => DataType::Float64,
            Self::Text => DataType::Utf8,
            Self::Date => DataType::Date32,
            Self::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
            Self::Boolean => DataType::Boolean,
        }
    }

    /// Whether the source stores this type as a SAS numeric value.
    ///
    /// SAS has only numeric and character storage; dates, timestamps and
    /// flags are numeric, so they carry numeric missing values.
    #[must_use]
    pub const fn stores_numeric(self) -> bool {
        !matches!(self, Self::Text)
    }
}

impl FromStr for ColumnType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let column_type = match normalized.as_str() {
            "smallint" | "int2" => Self::SmallInt,
            "integer" | "int" | "int4" => Self::Integer,
            "bigint" | "int8" => Self::BigInt,
            "real" | "float4" => Self::Real,
            "double" | "double precision" | "float8" | "float" | "numeric" => Self::Double,
            "text" | "varchar" | "character varying" | "char" | "character" => Self::Text,
            "date" => Self::Date,
            "timestamp" | "timestamp without time zone" => Self::Timestamp,
            "boolean" | "bool" => Self::Boolean,
            _ => return Err(ExportError::UnknownType(s.to_string())),
        };
        Ok(column_type)
    }
}

impl TryFrom<String> for ColumnType {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.tag().to_string()
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
