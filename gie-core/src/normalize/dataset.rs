use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;

use crate::error::GieError;
use crate::record::GAS_DAY_FIELD;

use super::schema::{STATUS_FIELD, UPDATED_AT_FIELD};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Normalized records as a polars frame.
///
/// Columns, in order: `gasDayStart` (Date), one Float64 column per measurement
/// in order of first appearance, `status` (String), and `updatedAt`
/// (Datetime, ms) when the records carried it. Rows keep the order in which
/// the records were fetched, and each gas day appears at most once.
#[derive(Debug, Clone)]
pub struct NormalizedDataset {
    frame: DataFrame,
}

impl NormalizedDataset {
    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// The date index.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, GieError> {
        let days = self.frame.column(GAS_DAY_FIELD)?.cast(&DataType::Int32)?;
        Ok(days
            .i32()?
            .into_iter()
            .filter_map(|d| d.and_then(epoch_days_to_date))
            .collect())
    }

    pub fn statuses(&self) -> Result<Vec<Option<String>>, GieError> {
        Ok(self
            .frame
            .column(STATUS_FIELD)?
            .str()?
            .into_iter()
            .map(|s| s.map(str::to_string))
            .collect())
    }

    /// Values of one measurement column.
    pub fn numeric(&self, column: &str) -> Result<Vec<Option<f64>>, GieError> {
        Ok(self.frame.column(column)?.f64()?.into_iter().collect())
    }

    /// Names of the measurement columns, in frame order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .filter(|c| c.dtype() == &DataType::Float64)
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Last-updated timestamps, if the records carried them.
    pub fn updated_at(&self) -> Result<Option<Vec<Option<NaiveDateTime>>>, GieError> {
        let Some(column) = self.frame.column(UPDATED_AT_FIELD).ok() else {
            return Ok(None);
        };
        let millis = column.cast(&DataType::Int64)?;
        Ok(Some(
            millis
                .i64()?
                .into_iter()
                .map(|ms| {
                    ms.and_then(DateTime::<Utc>::from_timestamp_millis)
                        .map(|dt| dt.naive_utc())
                })
                .collect(),
        ))
    }

    /// A copy sorted by gas day, stable for equal days.
    pub fn sorted_by_date(&self) -> Result<Self, GieError> {
        let frame = self
            .frame
            .clone()
            .lazy()
            .sort(
                [GAS_DAY_FIELD],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .collect()?;
        Ok(Self { frame })
    }
}
