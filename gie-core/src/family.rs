//! API families and how an entity is addressed on each protocol generation.

use gie_registry::{CanonicalEntity, EntityKind};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Protocol;

/// The two upstream APIs: AGSI+ (gas storage) and ALSI (LNG terminals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFamily {
    GasStorage,
    Lng,
}

impl ApiFamily {
    /// Entity kinds the family can be queried for.
    pub fn accepts(&self, kind: EntityKind) -> bool {
        match self {
            ApiFamily::GasStorage => matches!(
                kind,
                EntityKind::Country | EntityKind::Company | EntityKind::Storage
            ),
            ApiFamily::Lng => matches!(
                kind,
                EntityKind::Country | EntityKind::Terminal | EntityKind::Lso
            ),
        }
    }

    pub fn default_base_url(&self, protocol: Protocol) -> &'static str {
        match (self, protocol) {
            (ApiFamily::GasStorage, Protocol::Paginated) => "https://agsi.gie.eu/api",
            (ApiFamily::Lng, Protocol::Paginated) => "https://alsi.gie.eu/api",
            (ApiFamily::GasStorage, Protocol::PathAddressed) => "https://agsi.gie.eu/api/data/",
            (ApiFamily::Lng, Protocol::PathAddressed) => "https://alsi.gie.eu/api/data/",
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFamily::GasStorage => f.write_str("gas storage"),
            ApiFamily::Lng => f.write_str("LNG"),
        }
    }
}

/// Query parameters identifying an entity on the paginated API.
pub fn entity_params(entity: &CanonicalEntity) -> Vec<(String, String)> {
    match entity.kind {
        EntityKind::Country => vec![("country".into(), entity.code.clone())],
        EntityKind::Company | EntityKind::Lso => vec![
            ("country".into(), entity.country.clone()),
            ("company".into(), entity.code.clone()),
        ],
        EntityKind::Storage | EntityKind::Terminal => vec![
            ("country".into(), entity.country.clone()),
            ("company".into(), entity.company.clone().unwrap_or_default()),
            ("facility".into(), entity.code.clone()),
        ],
    }
}

/// URL path segment identifying an entity on the path-addressed API.
pub fn entity_path(entity: &CanonicalEntity) -> String {
    match entity.kind {
        EntityKind::Country => entity.code.clone(),
        EntityKind::Company | EntityKind::Lso => format!("{}/{}", entity.code, entity.country),
        EntityKind::Storage | EntityKind::Terminal => format!(
            "{}/{}/{}",
            entity.code,
            entity.country,
            entity.company.as_deref().unwrap_or_default()
        ),
    }
}
