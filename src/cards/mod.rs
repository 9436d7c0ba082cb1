//! Card records and the catalogs that serve them.
//!
//! ## Key Types
//!
//! - `CardId`: Card passcode
//! - `TypeFlags`: Card type bitmask (monster, spell, normal, xyz, ...)
//! - `Card`: Immutable card record
//! - `CardCatalog`: Read-only lookup and bulk scans
//! - `CatalogSource`: Opens one catalog per rebuild worker
//! - `MemoryCatalog` / `SqliteCatalog`: In-memory and database catalogs

pub mod catalog;
pub mod definition;
pub mod registry;
pub mod sqlite;

pub use catalog::{CardCatalog, CatalogSource};
pub use definition::{Card, CardId, TypeFlags};
pub use registry::MemoryCatalog;
pub use sqlite::{SqliteCatalog, SqliteSource};
