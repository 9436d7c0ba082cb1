//! Free-text description parsing.
//!
//! Turns a Deck Master's printed text into the raw pieces of its domain:
//! quoted mentions, battle stats, races and attributes. Interpreting the
//! mentions (archetype or card name?) is left to the domain builder.

pub mod description;

pub use description::{DescriptionParser, Extraction};
