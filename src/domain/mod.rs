//! Deck Master domains and deck checking.
//!
//! ## Key Types
//!
//! - `DomainContext`: Reference tables plus the compiled description parser
//! - `Domain`: One Deck Master's rule set and its collected members
//! - `DomainRows`: The rule set as the reverse index stores it
//! - `DeckChecker`: Size, singleton and domain checks for a decoded deck

pub mod checker;
pub mod context;
pub mod model;

pub use checker::{Deck, DeckChecker, DeckIssue, DeckVerdict};
pub use context::DomainContext;
pub use model::{Domain, DomainRows};
