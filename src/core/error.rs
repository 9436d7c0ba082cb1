//! Crate-wide error type.
//!
//! Only failures a caller can act on live here. Malformed reference
//! sections and description fragments that don't parse are logged and
//! recovered where they happen, so they never show up as an `Error`.

use thiserror::Error;

use crate::cards::CardId;

/// Errors surfaced by catalogs, the reverse index and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    /// No card with this id exists in the catalog.
    #[error("could not find card with id [{0}]")]
    CardIdNotFound(CardId),

    /// No card with this name exists in the catalog (case-insensitive).
    #[error("could not find card named [{0}]")]
    CardNameNotFound(String),

    /// The card exists but is not a (non-token) monster.
    #[error("card [{0}] is not a monster card")]
    NotAMonster(CardId),

    /// The Deck Master has no rows in the reverse index.
    #[error("deck master [{0}] is not in the domain index")]
    NotIndexed(CardId),

    /// The index rebuild was aborted; nothing from the batch was written.
    #[error("domain index rebuild failed: {0}")]
    RebuildFailed(#[source] Box<Error>),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// True for the "not found" family of errors.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CardIdNotFound(_) | Error::CardNameNotFound(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
