//! GIE Registry: identifiers for the AGSI+ and ALSI transparency platforms.
//!
//! Maps human-friendly symbolic names (`ugs_bergermeer`, `gate_terminal`) and
//! provider codes to canonical entity descriptors carrying the parameters the
//! upstream API expects. Five kinds: country, storage operator, storage
//! facility, LNG terminal and LNG system operator.

pub mod entity;
pub mod registry;

pub use entity::{CanonicalEntity, EntityKind, EntityRef};
pub use registry::{resolve, Registry, RegistryError, ResolveError};
