//! Entity descriptors produced by resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five kinds of addressable entity. Each kind has its own lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Country,
    /// Storage system operator (gas storage family).
    Company,
    /// Underground or virtual gas storage facility.
    Storage,
    /// LNG import terminal.
    Terminal,
    /// LNG system operator.
    Lso,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Country,
        EntityKind::Company,
        EntityKind::Storage,
        EntityKind::Terminal,
        EntityKind::Lso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Country => "country",
            EntityKind::Company => "company",
            EntityKind::Storage => "storage",
            EntityKind::Terminal => "terminal",
            EntityKind::Lso => "lso",
        }
    }

    /// Kind that a facility's `company` field must point at.
    pub fn operator_kind(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Storage => Some(EntityKind::Company),
            EntityKind::Terminal => Some(EntityKind::Lso),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable descriptor of a resolved entity.
///
/// `code` is unique within a kind for almost every entry; where the upstream
/// registry reuses a code (an operator active in two countries), lookups by
/// code return the entry declared first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub kind: EntityKind,
    /// Symbolic registry name, e.g. `ugs_bergermeer`.
    pub name: String,
    /// Provider-assigned identifier (EIC code, or ISO-like code for countries).
    pub code: String,
    /// Country code. For countries this equals `code`.
    pub country: String,
    /// Operator code for storage facilities and terminals.
    pub company: Option<String>,
    /// Display name; only countries carry one.
    pub full_name: Option<String>,
}

impl CanonicalEntity {
    pub fn is_facility(&self) -> bool {
        matches!(self.kind, EntityKind::Storage | EntityKind::Terminal)
    }
}

impl fmt::Display for CanonicalEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.kind, self.name, self.code)
    }
}

/// Caller-supplied entity reference: either an already-resolved entity or a
/// raw token (symbolic name or code) still to be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    Resolved(CanonicalEntity),
    Token(String),
}

impl From<CanonicalEntity> for EntityRef {
    fn from(entity: CanonicalEntity) -> Self {
        EntityRef::Resolved(entity)
    }
}

impl From<&CanonicalEntity> for EntityRef {
    fn from(entity: &CanonicalEntity) -> Self {
        EntityRef::Resolved(entity.clone())
    }
}

impl From<&str> for EntityRef {
    fn from(token: &str) -> Self {
        EntityRef::Token(token.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(token: String) -> Self {
        EntityRef::Token(token)
    }
}

impl From<&String> for EntityRef {
    fn from(token: &String) -> Self {
        EntityRef::Token(token.clone())
    }
}
