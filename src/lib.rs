//! # dm-domains
//!
//! Deck Master domains for Yu-Gi-Oh! card databases.
//!
//! A Deck Master's domain is the set of cards it admits: monsters sharing
//! its attribute or race, plus whatever its printed text names (archetypes,
//! specific cards, exact ATK/DEF). This crate derives those domains and
//! answers the reverse question: which Deck Masters admit all of a given
//! set of cards?
//!
//! ## Design Principles
//!
//! 1. **No globals**: Reference tables, the parser and the catalogs are
//!    plain values built once from `EngineConfig` and passed by reference.
//!
//! 2. **Base archetypes**: Domains store archetype codes resolved to their
//!    base, so sub-archetypes are admitted by their parent and never the
//!    other way around.
//!
//! 3. **Parse once**: Domains are parsed when the reverse index is built
//!    and reloaded from its rows afterwards.
//!
//! ## Modules
//!
//! - `core`: Setcodes, configuration, errors
//! - `cards`: Card records and catalogs (in-memory and SQLite)
//! - `reference`: Archetype hierarchy, attribute and race tables
//! - `parser`: Description parsing
//! - `domain`: Domains, member passes, deck checking
//! - `lookup`: The persisted reverse index

pub mod core;
pub mod cards;
pub mod reference;
pub mod parser;
pub mod domain;
pub mod lookup;

// Re-export commonly used types
pub use crate::core::{EngineConfig, Error, Result, SetCode};

pub use crate::cards::{
    Card, CardCatalog, CardId, CatalogSource, MemoryCatalog, SqliteCatalog, SqliteSource,
    TypeFlags,
};

pub use crate::reference::{ArchetypeHierarchy, Reference, Vocabulary};

pub use crate::parser::{DescriptionParser, Extraction};

pub use crate::domain::{Deck, DeckChecker, DeckIssue, DeckVerdict, Domain, DomainContext, DomainRows};

pub use crate::lookup::{RebuildReport, ReverseIndex};
