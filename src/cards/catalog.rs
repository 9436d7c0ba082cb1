//! Card catalog interface.
//!
//! The catalog is the read-only store of every card record. Domain
//! building and the reverse index only ever talk to it through
//! `CardCatalog`, so fixture data and a real card database are
//! interchangeable.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::{Error, Result};

use super::definition::{Card, CardId};

/// Read-only access to card records.
///
/// "Monster" always means a non-token monster.
pub trait CardCatalog {
    /// Look up any card by passcode.
    fn card_by_id(&self, id: CardId) -> Result<Card>;

    /// Look up any card by exact name, ignoring case.
    fn card_by_name(&self, name: &str) -> Result<Card>;

    /// Ids of every monster.
    fn monster_ids(&self) -> Result<BTreeSet<CardId>>;

    /// Monsters whose attribute is in `attributes` or whose race is in `races`.
    fn monsters_by_attribute_or_race(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>>;

    /// Monsters whose attribute is not in `attributes` and whose race is not in `races`.
    fn monsters_excluding(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>>;

    /// Every card that is neither a monster nor a token.
    fn spells_and_traps(&self) -> Result<Vec<Card>>;

    /// Look up a card that must be a monster (a Deck Master candidate).
    fn monster_by_id(&self, id: CardId) -> Result<Card> {
        let card = self.card_by_id(id)?;
        if card.is_monster() {
            Ok(card)
        } else {
            Err(Error::NotAMonster(id))
        }
    }
}

impl<T: CardCatalog + ?Sized> CardCatalog for &T {
    fn card_by_id(&self, id: CardId) -> Result<Card> {
        (**self).card_by_id(id)
    }

    fn card_by_name(&self, name: &str) -> Result<Card> {
        (**self).card_by_name(name)
    }

    fn monster_ids(&self) -> Result<BTreeSet<CardId>> {
        (**self).monster_ids()
    }

    fn monsters_by_attribute_or_race(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        (**self).monsters_by_attribute_or_race(attributes, races)
    }

    fn monsters_excluding(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        (**self).monsters_excluding(attributes, races)
    }

    fn spells_and_traps(&self) -> Result<Vec<Card>> {
        (**self).spells_and_traps()
    }
}

impl<T: CardCatalog + ?Sized> CardCatalog for Arc<T> {
    fn card_by_id(&self, id: CardId) -> Result<Card> {
        (**self).card_by_id(id)
    }

    fn card_by_name(&self, name: &str) -> Result<Card> {
        (**self).card_by_name(name)
    }

    fn monster_ids(&self) -> Result<BTreeSet<CardId>> {
        (**self).monster_ids()
    }

    fn monsters_by_attribute_or_race(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        (**self).monsters_by_attribute_or_race(attributes, races)
    }

    fn monsters_excluding(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        (**self).monsters_excluding(attributes, races)
    }

    fn spells_and_traps(&self) -> Result<Vec<Card>> {
        (**self).spells_and_traps()
    }
}

/// Opens catalogs for index rebuild workers.
///
/// Each worker calls `open` once and keeps the catalog to itself, so
/// nothing mutable is shared between workers.
pub trait CatalogSource: Sync {
    type Catalog: CardCatalog;

    fn open(&self) -> Result<Self::Catalog>;
}
