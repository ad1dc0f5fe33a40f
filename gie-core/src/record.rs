//! Raw upstream records, before normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// Gas day field used by the current APIs.
pub const GAS_DAY_FIELD: &str = "gasDayStart";

/// Gas day field used by legacy LNG records.
pub const LEGACY_GAS_DAY_FIELD: &str = "gasDayStartedOn";

/// One row of upstream JSON, kept as returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Raw gas day value, from whichever day field the record carries.
    pub fn gas_day_raw(&self) -> Option<&str> {
        self.0
            .get(GAS_DAY_FIELD)
            .or_else(|| self.0.get(LEGACY_GAS_DAY_FIELD))
            .and_then(Value::as_str)
    }

    /// Parsed gas day, if present and well-formed.
    pub fn gas_day(&self) -> Option<NaiveDate> {
        self.gas_day_raw().and_then(parse_gas_day)
    }

    /// Parsed gas day, or the error naming `row` when it is missing or bad.
    pub fn require_gas_day(&self, row: usize) -> Result<NaiveDate, NormalizeError> {
        let raw = self
            .gas_day_raw()
            .ok_or(NormalizeError::MissingDate { row })?;
        parse_gas_day(raw).ok_or_else(|| NormalizeError::InvalidDate {
            row,
            value: raw.to_string(),
        })
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Parse a gas day: `YYYY-MM-DD`, or the date part of an ISO date-time.
pub fn parse_gas_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().or_else(|| {
        value
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .filter(|_| matches!(value.as_bytes().get(10), Some(b'T' | b' ')))
    })
}
