//! Reverse domain lookup.
//!
//! `ReverseIndex` keeps every Deck Master's domain as relational rows so
//! "which domains admit these cards?" is a handful of indexed queries.
//! `schema` holds the table layout.

pub mod index;
pub mod schema;

pub use index::{RebuildReport, ReverseIndex};
