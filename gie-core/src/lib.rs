//! GIE Core: client for the AGSI+ gas storage and ALSI LNG transparency APIs.
//!
//! This crate contains:
//! - Query engine for both upstream protocols (path-addressed windows with the
//!   anomaly retry, and query-parameter pagination)
//! - Dataset normalizer producing a date-indexed polars frame
//! - Blocking HTTP transport with a scripted stub for offline tests
//! - Client configuration loadable from TOML
//! - Raw and normalizing clients with one query per entity kind and family
//!
//! Entity resolution lives in the `gie-registry` crate and is re-exported here.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod family;
pub mod normalize;
pub mod record;
pub mod response;
pub mod transport;
pub mod window;

pub use client::{DatasetClient, GieClient, IntoGasDay};
pub use config::{ClientConfig, ConfigError, Protocol};
pub use engine::QueryEngine;
pub use error::{GieError, NormalizeError};
pub use family::ApiFamily;
pub use normalize::{normalize, NormalizedDataset, Normalizer};
pub use record::RawRecord;
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, StubTransport, Transport};
pub use window::{plan_windows, QueryWindow};

pub use gie_registry::{resolve, CanonicalEntity, EntityKind, EntityRef, Registry, ResolveError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: clients can be moved to and shared across threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<GieClient>();
        require_sync::<GieClient>();
        require_send::<DatasetClient<StubTransport>>();
        require_sync::<DatasetClient<StubTransport>>();
        require_send::<NormalizedDataset>();
        require_send::<GieError>();
        require_sync::<GieError>();
    }
}
