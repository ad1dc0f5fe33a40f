//! Caller-facing clients.
//!
//! [`GieClient`] returns the raw record sequence; [`DatasetClient`] runs the
//! same queries and normalizes the result. Both accept entity references as
//! symbolic names, codes or resolved entities, and dates as [`NaiveDate`],
//! [`NaiveDateTime`] or date-like strings.

use chrono::{NaiveDate, NaiveDateTime};
use gie_registry::{EntityKind, EntityRef, Registry};

use crate::config::ClientConfig;
use crate::engine::QueryEngine;
use crate::error::GieError;
use crate::family::ApiFamily;
use crate::normalize::{NormalizedDataset, Normalizer};
use crate::record::{parse_gas_day, RawRecord};
use crate::transport::{ReqwestTransport, Transport};
use crate::window::QueryWindow;

/// A value usable as a query start or end date.
pub trait IntoGasDay {
    fn into_gas_day(self) -> Result<NaiveDate, GieError>;
}

impl IntoGasDay for NaiveDate {
    fn into_gas_day(self) -> Result<NaiveDate, GieError> {
        Ok(self)
    }
}

impl IntoGasDay for NaiveDateTime {
    fn into_gas_day(self) -> Result<NaiveDate, GieError> {
        Ok(self.date())
    }
}

impl IntoGasDay for &str {
    fn into_gas_day(self) -> Result<NaiveDate, GieError> {
        parse_gas_day(self).ok_or_else(|| GieError::InvalidDate {
            input: self.to_string(),
        })
    }
}

impl IntoGasDay for String {
    fn into_gas_day(self) -> Result<NaiveDate, GieError> {
        self.as_str().into_gas_day()
    }
}

impl IntoGasDay for &String {
    fn into_gas_day(self) -> Result<NaiveDate, GieError> {
        self.as_str().into_gas_day()
    }
}

/// Client returning raw upstream records.
pub struct GieClient<T = ReqwestTransport> {
    engine: QueryEngine<T>,
    registry: &'static Registry,
}

impl GieClient<ReqwestTransport> {
    /// Validate `config` and build a client over a blocking reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self, GieError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> GieClient<T> {
    /// Build a client over any transport. The config is used as given.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            engine: QueryEngine::new(transport, config),
            registry: Registry::builtin(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &QueryEngine<T> {
        &self.engine
    }

    /// Resolve `entity` as `kind` and fetch `start..=end` from `family`.
    pub fn query(
        &self,
        family: ApiFamily,
        kind: EntityKind,
        entity: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        let entity = self.registry.resolve(kind, entity)?;
        let range = QueryWindow::new(start.into_gas_day()?, end.into_gas_day()?)?;
        self.engine.fetch(&entity, family, range)
    }

    pub fn query_gas_storage(
        &self,
        storage: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Storage, storage, start, end)
    }

    pub fn query_gas_company(
        &self,
        company: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Company, company, start, end)
    }

    pub fn query_gas_country(
        &self,
        country: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Country, country, start, end)
    }

    pub fn query_lng_terminal(
        &self,
        terminal: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Terminal, terminal, start, end)
    }

    pub fn query_lng_lso(
        &self,
        lso: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Lso, lso, start, end)
    }

    pub fn query_lng_country(
        &self,
        country: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<Vec<RawRecord>, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Country, country, start, end)
    }
}

/// Client returning normalized datasets.
///
/// Rows with status `N` are dropped unless the config disables
/// `drop_not_applicable`.
pub struct DatasetClient<T = ReqwestTransport> {
    raw: GieClient<T>,
}

impl DatasetClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, GieError> {
        Ok(Self {
            raw: GieClient::new(config)?,
        })
    }
}

impl<T: Transport> DatasetClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            raw: GieClient::with_transport(config, transport),
        }
    }

    /// The underlying raw client.
    pub fn raw(&self) -> &GieClient<T> {
        &self.raw
    }

    pub fn query(
        &self,
        family: ApiFamily,
        kind: EntityKind,
        entity: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        let records = self.raw.query(family, kind, entity, start, end)?;
        Normalizer::new(family)
            .drop_not_applicable(self.raw.config().drop_not_applicable)
            .normalize(&records)
    }

    pub fn query_gas_storage(
        &self,
        storage: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Storage, storage, start, end)
    }

    pub fn query_gas_company(
        &self,
        company: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Company, company, start, end)
    }

    pub fn query_gas_country(
        &self,
        country: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::GasStorage, EntityKind::Country, country, start, end)
    }

    pub fn query_lng_terminal(
        &self,
        terminal: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Terminal, terminal, start, end)
    }

    pub fn query_lng_lso(
        &self,
        lso: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Lso, lso, start, end)
    }

    pub fn query_lng_country(
        &self,
        country: impl Into<EntityRef>,
        start: impl IntoGasDay,
        end: impl IntoGasDay,
    ) -> Result<NormalizedDataset, GieError> {
        self.query(ApiFamily::Lng, EntityKind::Country, country, start, end)
    }
}
