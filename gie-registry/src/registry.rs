//! Static identifier registry and the resolver over it.
//!
//! The registry is stored as a TOML table (one array of tables per entity
//! kind) and embedded in the crate. It is parsed and checked for referential
//! integrity once, on first use, and is immutable afterwards.

use crate::entity::{CanonicalEntity, EntityKind, EntityRef};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

const BUILTIN_TABLE: &str = include_str!("../data/registry.toml");

static BUILTIN: LazyLock<Registry> = LazyLock::new(|| {
    Registry::from_toml(BUILTIN_TABLE).expect("embedded registry table is valid")
});

/// Resolution failure: the token matched neither a symbolic name nor a code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid {kind} reference: '{token}'")]
    InvalidReference { kind: EntityKind, token: String },
}

/// Errors raised while loading a registry table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("parse registry TOML: {0}")]
    Parse(String),

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("{kind} '{name}' references unknown country '{country}'")]
    UnknownCountry {
        kind: EntityKind,
        name: String,
        country: String,
    },

    #[error("{kind} '{name}' references unknown operator '{company}'")]
    UnknownOperator {
        kind: EntityKind,
        name: String,
        company: String,
    },
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    name: String,
    code: String,
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct OperatorRow {
    name: String,
    code: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct FacilityRow {
    name: String,
    code: String,
    country: String,
    company: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    country: Vec<CountryRow>,
    #[serde(default)]
    company: Vec<OperatorRow>,
    #[serde(default)]
    lso: Vec<OperatorRow>,
    #[serde(default)]
    storage: Vec<FacilityRow>,
    #[serde(default)]
    terminal: Vec<FacilityRow>,
}

/// Lookup table for a single kind, keyed by symbolic name and by code.
#[derive(Debug, Default)]
struct KindTable {
    entries: Vec<CanonicalEntity>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl KindTable {
    fn insert(&mut self, entity: CanonicalEntity) -> Result<(), RegistryError> {
        let index = self.entries.len();
        if self.by_name.insert(entity.name.clone(), index).is_some() {
            return Err(RegistryError::DuplicateName {
                kind: entity.kind,
                name: entity.name,
            });
        }
        // First declaration wins for shared codes.
        self.by_code.entry(entity.code.clone()).or_insert(index);
        self.entries.push(entity);
        Ok(())
    }

    fn find(&self, token: &str) -> Option<&CanonicalEntity> {
        self.by_name
            .get(token)
            .or_else(|| self.by_code.get(token))
            .map(|&i| &self.entries[i])
    }

    fn has_code(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }
}

/// Immutable registry of every addressable entity, one table per kind.
#[derive(Debug)]
pub struct Registry {
    tables: HashMap<EntityKind, KindTable>,
}

impl Registry {
    /// The registry shipped with the crate.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Parse a registry from its TOML representation and validate it.
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|e| RegistryError::Parse(e.to_string()))?;

        let mut tables: HashMap<EntityKind, KindTable> = EntityKind::ALL
            .iter()
            .map(|&kind| (kind, KindTable::default()))
            .collect();

        for row in file.country {
            table_mut(&mut tables, EntityKind::Country).insert(CanonicalEntity {
                kind: EntityKind::Country,
                name: row.name,
                country: row.code.clone(),
                code: row.code,
                company: None,
                full_name: Some(row.full_name),
            })?;
        }
        for (kind, rows) in [(EntityKind::Company, file.company), (EntityKind::Lso, file.lso)] {
            for row in rows {
                table_mut(&mut tables, kind).insert(CanonicalEntity {
                    kind,
                    name: row.name,
                    code: row.code,
                    country: row.country,
                    company: None,
                    full_name: None,
                })?;
            }
        }
        for (kind, rows) in [
            (EntityKind::Storage, file.storage),
            (EntityKind::Terminal, file.terminal),
        ] {
            for row in rows {
                table_mut(&mut tables, kind).insert(CanonicalEntity {
                    kind,
                    name: row.name,
                    code: row.code,
                    country: row.country,
                    company: Some(row.company),
                    full_name: None,
                })?;
            }
        }

        let registry = Self { tables };
        registry.check_references()?;
        Ok(registry)
    }

    /// Every non-country entity must name a known country, and every facility
    /// a known operator of the matching kind.
    fn check_references(&self) -> Result<(), RegistryError> {
        let countries = self.table(EntityKind::Country);
        for kind in EntityKind::ALL {
            if kind == EntityKind::Country {
                continue;
            }
            for entity in self.entities(kind) {
                if !countries.has_code(&entity.country) {
                    return Err(RegistryError::UnknownCountry {
                        kind,
                        name: entity.name.clone(),
                        country: entity.country.clone(),
                    });
                }
                if let (Some(operator_kind), Some(company)) =
                    (kind.operator_kind(), entity.company.as_deref())
                {
                    if !self.table(operator_kind).has_code(company) {
                        return Err(RegistryError::UnknownOperator {
                            kind,
                            name: entity.name.clone(),
                            company: company.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn table(&self, kind: EntityKind) -> &KindTable {
        // Every kind gets a table in `from_toml`.
        &self.tables[&kind]
    }

    /// All entities of a kind, in declaration order.
    pub fn entities(&self, kind: EntityKind) -> &[CanonicalEntity] {
        &self.table(kind).entries
    }

    /// Look up a token by symbolic name first, then by code.
    pub fn lookup(&self, kind: EntityKind, token: &str) -> Result<&CanonicalEntity, ResolveError> {
        self.table(kind)
            .find(token)
            .ok_or_else(|| ResolveError::InvalidReference {
                kind,
                token: token.to_string(),
            })
    }

    /// Resolve a reference to a canonical entity of `kind`.
    ///
    /// An already-resolved entity of the same kind is returned unchanged; one
    /// of another kind is an invalid reference.
    pub fn resolve(
        &self,
        kind: EntityKind,
        reference: impl Into<EntityRef>,
    ) -> Result<CanonicalEntity, ResolveError> {
        match reference.into() {
            EntityRef::Resolved(entity) if entity.kind == kind => Ok(entity),
            EntityRef::Resolved(entity) => Err(ResolveError::InvalidReference {
                kind,
                token: entity.code,
            }),
            EntityRef::Token(token) => self.lookup(kind, &token).cloned(),
        }
    }
}

fn table_mut(tables: &mut HashMap<EntityKind, KindTable>, kind: EntityKind) -> &mut KindTable {
    tables.entry(kind).or_default()
}

/// Resolve against the built-in registry.
pub fn resolve(
    kind: EntityKind,
    reference: impl Into<EntityRef>,
) -> Result<CanonicalEntity, ResolveError> {
    Registry::builtin().resolve(kind, reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        [[country]]
        name = "NL"
        code = "NL"
        full_name = "Netherlands"

        [[company]]
        name = "taqa_gas_storage"
        code = "21X000000001120V"
        country = "NL"

        [[storage]]
        name = "ugs_bergermeer"
        code = "21W0000000000087"
        country = "NL"
        company = "21X000000001120V"
    "#;

    #[test]
    fn builtin_table_loads() {
        let registry = Registry::builtin();
        assert!(registry.entities(EntityKind::Country).len() > 20);
        assert!(registry.entities(EntityKind::Storage).len() > 100);
        assert!(!registry.entities(EntityKind::Terminal).is_empty());
        assert!(!registry.entities(EntityKind::Lso).is_empty());
    }

    #[test]
    fn lookup_by_name_then_code() {
        let registry = Registry::from_toml(SMALL).unwrap();
        let by_name = registry.lookup(EntityKind::Storage, "ugs_bergermeer").unwrap();
        let by_code = registry.lookup(EntityKind::Storage, "21W0000000000087").unwrap();
        assert_eq!(by_name, by_code);
        assert_eq!(by_name.country, "NL");
        assert_eq!(by_name.company.as_deref(), Some("21X000000001120V"));
    }

    #[test]
    fn unknown_token_names_kind_and_token() {
        let registry = Registry::from_toml(SMALL).unwrap();
        let err = registry.resolve(EntityKind::Company, "nope").unwrap_err();
        assert_eq!(
            err,
            ResolveError::InvalidReference {
                kind: EntityKind::Company,
                token: "nope".into()
            }
        );
        assert_eq!(err.to_string(), "invalid company reference: 'nope'");
    }

    #[test]
    fn resolved_entity_of_other_kind_is_rejected() {
        let registry = Registry::from_toml(SMALL).unwrap();
        let storage = registry.resolve(EntityKind::Storage, "ugs_bergermeer").unwrap();
        let err = registry.resolve(EntityKind::Company, storage).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidReference { kind: EntityKind::Company, .. }));
    }

    #[test]
    fn rejects_dangling_operator() {
        let broken = SMALL.replace(
            "company = \"21X000000001120V\"\n",
            "company = \"21XMISSING\"\n",
        );
        let err = Registry::from_toml(&broken).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownOperator { .. }));
    }

    #[test]
    fn rejects_dangling_country() {
        let broken = SMALL.replace("country = \"NL\"\n        company", "country = \"XX\"\n        company");
        let err = Registry::from_toml(&broken).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownCountry { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let doubled = format!(
            "{SMALL}\n[[country]]\nname = \"NL\"\ncode = \"NL2\"\nfull_name = \"Again\"\n"
        );
        let err = Registry::from_toml(&doubled).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                kind: EntityKind::Country,
                name: "NL".into()
            }
        );
    }

    #[test]
    fn shared_code_resolves_to_first_declaration() {
        let registry = Registry::builtin();
        let astora = registry.resolve(EntityKind::Company, "21X000000001160J").unwrap();
        assert_eq!(astora.name, "astora");
        assert_eq!(astora.country, "AT");
        let germany = registry.resolve(EntityKind::Company, "astora_germany").unwrap();
        assert_eq!(germany.country, "DE");
    }
}
