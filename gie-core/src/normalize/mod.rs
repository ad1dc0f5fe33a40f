//! Dataset normalization: raw records into a typed, date-indexed frame.

pub mod dataset;
pub mod schema;

pub use dataset::NormalizedDataset;
pub use schema::{ColumnKind, RecordSchema};

use chrono::NaiveDateTime;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{GieError, NormalizeError};
use crate::family::ApiFamily;
use crate::record::{RawRecord, GAS_DAY_FIELD};

use dataset::date_to_epoch_days;
use schema::{
    coerce_numeric, coerce_status, coerce_timestamp, NOT_APPLICABLE, STATUS_FIELD,
    UPDATED_AT_FIELD,
};

/// Builds a [`NormalizedDataset`] from raw records of one API family.
pub struct Normalizer {
    family: ApiFamily,
    drop_not_applicable: bool,
}

impl Normalizer {
    /// A normalizer that drops not-applicable rows.
    pub fn new(family: ApiFamily) -> Self {
        Self {
            family,
            drop_not_applicable: true,
        }
    }

    pub fn drop_not_applicable(mut self, drop: bool) -> Self {
        self.drop_not_applicable = drop;
        self
    }

    /// Normalize `records`, preserving their order.
    ///
    /// Fails fast on the first record with a missing, unparseable or repeated
    /// gas day or an unconvertible value, and with [`GieError::EmptyResult`]
    /// when no rows survive filtering.
    pub fn normalize(&self, records: &[RawRecord]) -> Result<NormalizedDataset, GieError> {
        let kept: Vec<(usize, &RawRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, record)| !(self.drop_not_applicable && is_not_applicable(record)))
            .collect();

        let dropped = records.len() - kept.len();
        if dropped > 0 {
            debug!(family = %self.family, dropped, "dropped not-applicable rows");
        }
        if kept.is_empty() {
            return Err(GieError::EmptyResult);
        }

        let mut days = Vec::with_capacity(kept.len());
        let mut statuses = Vec::with_capacity(kept.len());
        let mut updated: Vec<Option<NaiveDateTime>> = Vec::with_capacity(kept.len());
        let mut has_updated = false;
        let mut numeric = NumericColumns::default();
        let mut seen = HashSet::with_capacity(kept.len());

        for (position, (row, record)) in kept.iter().enumerate() {
            let row = *row;
            let day = record.require_gas_day(row)?;
            if !seen.insert(day) {
                return Err(NormalizeError::DuplicateDate { row, date: day }.into());
            }
            days.push(date_to_epoch_days(day));
            statuses.push(record.get(STATUS_FIELD).and_then(coerce_status));

            let mut stamp = None;
            for (field, value) in record.fields() {
                match RecordSchema::classify(field) {
                    ColumnKind::Numeric => {
                        let v = coerce_numeric(row, field, value)?;
                        numeric.set(field, position, kept.len(), v);
                    }
                    ColumnKind::Timestamp => {
                        has_updated = true;
                        stamp = coerce_timestamp(row, field, value)?;
                    }
                    ColumnKind::Date
                    | ColumnKind::Status
                    | ColumnKind::Discriminator
                    | ColumnKind::Presentation => {}
                }
            }
            updated.push(stamp);
        }

        let mut columns = Vec::with_capacity(numeric.len() + 3);
        columns.push(Column::from(
            Series::new(GAS_DAY_FIELD.into(), days).cast(&DataType::Date)?,
        ));
        for (name, values) in numeric.into_columns() {
            columns.push(Column::from(Series::new(name.as_str().into(), values)));
        }
        columns.push(Column::from(Series::new(STATUS_FIELD.into(), statuses)));
        if has_updated {
            let millis: Vec<Option<i64>> = updated
                .iter()
                .map(|ts| ts.map(|ts| ts.and_utc().timestamp_millis()))
                .collect();
            columns.push(Column::from(
                Series::new(UPDATED_AT_FIELD.into(), millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
            ));
        }

        Ok(NormalizedDataset::from_frame(DataFrame::new(columns)?))
    }
}

/// Normalize with the default policy (not-applicable rows dropped).
pub fn normalize(records: &[RawRecord], family: ApiFamily) -> Result<NormalizedDataset, GieError> {
    Normalizer::new(family).normalize(records)
}

fn is_not_applicable(record: &RawRecord) -> bool {
    record
        .get(STATUS_FIELD)
        .and_then(|v| v.as_str())
        .is_some_and(|s| s == NOT_APPLICABLE)
}

/// Measurement columns in order of first appearance, padded with missing
/// values for rows that lack them.
#[derive(Default)]
struct NumericColumns {
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl NumericColumns {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn set(&mut self, name: &str, position: usize, height: usize, value: Option<f64>) {
        let index = match self.columns.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.columns.push((name.to_string(), vec![None; height]));
                self.columns.len() - 1
            }
        };
        self.columns[index].1[position] = value;
    }

    fn into_columns(self) -> Vec<(String, Vec<Option<f64>>)> {
        self.columns
    }
}
