//! Per-column schema for upstream records.
//!
//! Every field of a raw record is classified once, and the classification
//! alone decides how its values are converted. Fields not named here are
//! measurements.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde_json::Value;

use crate::error::NormalizeError;
use crate::record::{GAS_DAY_FIELD, LEGACY_GAS_DAY_FIELD};

/// Status classifier column, kept as a string.
pub const STATUS_FIELD: &str = "status";

/// Last-updated timestamp column.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Row-type discriminator, dropped.
pub const TYPE_FIELD: &str = "type";

/// Status marking a row as not applicable.
pub const NOT_APPLICABLE: &str = "N";

/// Placeholder the upstream uses for "no quantity", read as zero.
pub const PLACEHOLDER: &str = "-";

/// Unit retained from nested quantity objects.
pub const CANONICAL_UNIT: &str = "gwh";

const PRESENTATION_FIELDS: [&str; 5] = ["name", "code", "url", "info", "children"];

/// How a record field is treated during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Gas day, parsed into the date index.
    Date,
    /// Status classifier, never coerced.
    Status,
    /// Parsed into a millisecond timestamp.
    Timestamp,
    /// Row-type discriminator, dropped.
    Discriminator,
    /// Display-only field, dropped.
    Presentation,
    /// Coerced to `f64`.
    Numeric,
}

impl ColumnKind {
    pub fn is_dropped(&self) -> bool {
        matches!(self, ColumnKind::Discriminator | ColumnKind::Presentation)
    }
}

/// Column classification shared by both API families.
pub struct RecordSchema;

impl RecordSchema {
    pub fn classify(field: &str) -> ColumnKind {
        match field {
            GAS_DAY_FIELD | LEGACY_GAS_DAY_FIELD => ColumnKind::Date,
            STATUS_FIELD => ColumnKind::Status,
            UPDATED_AT_FIELD => ColumnKind::Timestamp,
            TYPE_FIELD => ColumnKind::Discriminator,
            f if PRESENTATION_FIELDS.contains(&f) => ColumnKind::Presentation,
            _ => ColumnKind::Numeric,
        }
    }

    /// Polars dtype of a kept column kind; `None` for dropped kinds.
    pub fn dtype(kind: ColumnKind) -> Option<DataType> {
        match kind {
            ColumnKind::Date => Some(DataType::Date),
            ColumnKind::Status => Some(DataType::String),
            ColumnKind::Timestamp => Some(DataType::Datetime(TimeUnit::Milliseconds, None)),
            ColumnKind::Numeric => Some(DataType::Float64),
            ColumnKind::Discriminator | ColumnKind::Presentation => None,
        }
    }
}

/// Coerce one measurement value.
///
/// Numbers pass through, `"-"` becomes `0.0`, null and empty strings become
/// missing, and a nested object is reduced to its [`CANONICAL_UNIT`] member.
pub fn coerce_numeric(row: usize, column: &str, value: &Value) -> Result<Option<f64>, NormalizeError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::Bool(b) => Ok(Some(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => {
            let s = s.trim();
            if s == PLACEHOLDER {
                return Ok(Some(0.0));
            }
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map(Some)
                .map_err(|_| NormalizeError::InvalidNumber {
                    row,
                    column: column.to_string(),
                    value: s.to_string(),
                })
        }
        Value::Object(units) => match units.get(CANONICAL_UNIT) {
            Some(inner @ (Value::Null | Value::Number(_) | Value::String(_) | Value::Bool(_))) => {
                coerce_numeric(row, column, inner)
            }
            _ => Err(NormalizeError::NonScalar {
                row,
                column: column.to_string(),
            }),
        },
        Value::Array(_) => Err(NormalizeError::NonScalar {
            row,
            column: column.to_string(),
        }),
    }
}

/// Status values are kept verbatim; non-string scalars are rendered as text.
pub fn coerce_status(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse a last-updated value into a naive UTC date-time.
pub fn coerce_timestamp(
    row: usize,
    column: &str,
    value: &Value,
) -> Result<Option<NaiveDateTime>, NormalizeError> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::String(s) => s.trim(),
        other => {
            return Err(NormalizeError::InvalidTimestamp {
                row,
                column: column.to_string(),
                value: other.to_string(),
            })
        }
    };
    if raw.is_empty() || raw == PLACEHOLDER {
        return Ok(None);
    }

    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()));

    parsed
        .map(Some)
        .ok_or_else(|| NormalizeError::InvalidTimestamp {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}
