//! Core types: packed setcodes, configuration, errors.
//!
//! Nothing in here knows about catalogs or the reverse index. The rest of
//! the crate builds on these.

pub mod config;
pub mod error;
pub mod setcode;

pub use config::{
    ArchetypeOverrides, BaseException, CodeReplacement, EngineConfig, ExtraName, ParserConfig,
    MAX_REBUILD_WORKERS,
};
pub use error::{Error, Result};
pub use setcode::{SetCode, BASE_ARCHETYPE_MASK};
