//! Decoding of upstream response bodies.
//!
//! Both protocol generations share one envelope shape. A well-formed error
//! payload (`"dataset": "ERROR"`) is surfaced as an application anomaly so the
//! engine can decide whether to retry.

use serde::Deserialize;

use crate::error::GieError;
use crate::record::RawRecord;

const ERROR_DATASET: &str = "ERROR";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    dataset: Option<String>,
    #[serde(default)]
    exception: Option<String>,
    #[serde(default)]
    data: Option<Vec<RawRecord>>,
    #[serde(default)]
    last_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Body {
    /// Legacy LNG endpoint: the record array with no envelope.
    Bare(Vec<RawRecord>),
    Envelope(Envelope),
}

/// One page of a paginated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<RawRecord>,
    pub last_page: u32,
}

fn parse(body: &str) -> Result<Body, GieError> {
    serde_json::from_str(body).map_err(|e| GieError::MalformedResponse(e.to_string()))
}

fn check_anomaly(envelope: &Envelope) -> Result<(), GieError> {
    if envelope.dataset.as_deref() == Some(ERROR_DATASET) {
        return Err(GieError::ApplicationAnomaly {
            message: envelope
                .exception
                .clone()
                .unwrap_or_else(|| "unspecified error".to_string()),
        });
    }
    Ok(())
}

/// Records from a path-addressed response: a bare array or `{ "data": [...] }`.
pub fn decode_records(body: &str) -> Result<Vec<RawRecord>, GieError> {
    match parse(body)? {
        Body::Bare(records) => Ok(records),
        Body::Envelope(envelope) => {
            check_anomaly(&envelope)?;
            envelope
                .data
                .ok_or_else(|| GieError::MalformedResponse("response has no 'data' array".into()))
        }
    }
}

/// A page from a paginated response. A missing `last_page` means one page.
pub fn decode_page(body: &str) -> Result<Page, GieError> {
    match parse(body)? {
        Body::Bare(_) => Err(GieError::MalformedResponse(
            "expected a paginated envelope, got a bare array".into(),
        )),
        Body::Envelope(envelope) => {
            check_anomaly(&envelope)?;
            let records = envelope
                .data
                .ok_or_else(|| GieError::MalformedResponse("response has no 'data' array".into()))?;
            Ok(Page {
                records,
                last_page: envelope.last_page.unwrap_or(1),
            })
        }
    }
}
