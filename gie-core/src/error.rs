//! Structured error types for query and normalization.
//!
//! Every variant is terminal for the call that raised it; the only internal
//! recovery is the widened-window retry on an application anomaly.

use gie_registry::{EntityKind, ResolveError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::family::ApiFamily;

#[derive(Debug, Error)]
pub enum GieError {
    #[error(transparent)]
    InvalidReference(#[from] ResolveError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("{kind} entities cannot be queried on the {family} API")]
    IncompatibleEntity { kind: EntityKind, family: ApiFamily },

    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid query window: start {start} is after end {end}")]
    InvalidWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("window {start}..{end} widened by {days} days leaves the supported calendar")]
    DateOutOfRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
        days: i64,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    #[error("server returned exception: {message}")]
    ApplicationAnomaly { message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no matching data found for the requested range")]
    NoMatchingData,

    #[error("no rows left after filtering not-applicable records")]
    EmptyResult,

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("dataframe error: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Record-level failures while building a normalized dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("record {row} has no gas day field")]
    MissingDate { row: usize },

    #[error("record {row}: unparseable gas day '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("record {row}: gas day {date} already appeared in an earlier record")]
    DuplicateDate { row: usize, date: chrono::NaiveDate },

    #[error("record {row}: column '{column}' is not numeric: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("record {row}: column '{column}' holds a non-scalar value")]
    NonScalar { row: usize, column: String },

    #[error("record {row}: unparseable timestamp in '{column}': {value}")]
    InvalidTimestamp {
        row: usize,
        column: String,
        value: String,
    },
}

impl GieError {
    /// True for failures caused by the caller's input rather than upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            GieError::InvalidReference(_)
                | GieError::Config(_)
                | GieError::IncompatibleEntity { .. }
                | GieError::InvalidDate { .. }
                | GieError::InvalidWindow { .. }
                | GieError::DateOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_keeps_status_and_body() {
        let err = GieError::UpstreamHttp {
            status: 403,
            body: "{\"error\":\"access denied\"}".into(),
        };
        assert_eq!(
            err.to_string(),
            "upstream returned HTTP 403: {\"error\":\"access denied\"}"
        );
        assert!(!err.is_caller_error());
    }

    #[test]
    fn resolve_error_passes_through_unchanged() {
        let err: GieError = ResolveError::InvalidReference {
            kind: EntityKind::Storage,
            token: "not-a-real-token".into(),
        }
        .into();
        assert_eq!(err.to_string(), "invalid storage reference: 'not-a-real-token'");
        assert!(err.is_caller_error());
    }
}
