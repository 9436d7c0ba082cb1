//! In-memory card catalog.
//!
//! `MemoryCatalog` holds card records in a hash map keyed by `CardId`,
//! with a second map for case-insensitive name lookup. Tests use it as a
//! fixture catalog; callers that already hold card data can use it
//! instead of a database.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{Error, Result};

use super::catalog::{CardCatalog, CatalogSource};
use super::definition::{Card, CardId};

/// Catalog of card records held in memory.
///
/// ## Example
///
/// ```
/// use dm_domains::cards::{Card, CardCatalog, CardId, MemoryCatalog};
///
/// let mut catalog = MemoryCatalog::new();
/// catalog.insert(Card::new(CardId::new(1), "Gem-Knight Lazuli"));
///
/// let found = catalog.card_by_name("gem-knight lazuli").unwrap();
/// assert_eq!(found.id, CardId::new(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    cards: FxHashMap<CardId, Card>,
    by_name: FxHashMap<String, CardId>,
}

impl MemoryCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of cards.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut catalog = Self::new();
        for card in cards {
            catalog.insert(card);
        }
        catalog
    }

    /// Insert a card, returning the record it replaced.
    ///
    /// When several cards share a name (alternate artworks), name lookup
    /// returns the lowest id.
    pub fn insert(&mut self, card: Card) -> Option<Card> {
        let key = card.name.to_lowercase();
        let id = card.id;
        self.by_name
            .entry(key)
            .and_modify(|existing| *existing = (*existing).min(id))
            .or_insert(id);
        self.cards.insert(id, card)
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Check if a card ID is present.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Cards matching a predicate, sorted by id.
    fn collect_sorted<F>(&self, predicate: F) -> Vec<Card>
    where
        F: Fn(&Card) -> bool,
    {
        let mut cards: Vec<Card> = self.cards.values().filter(|c| predicate(c)).cloned().collect();
        cards.sort_by_key(|c| c.id);
        cards
    }
}

impl CardCatalog for MemoryCatalog {
    fn card_by_id(&self, id: CardId) -> Result<Card> {
        self.cards.get(&id).cloned().ok_or(Error::CardIdNotFound(id))
    }

    fn card_by_name(&self, name: &str) -> Result<Card> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|id| self.cards.get(id))
            .cloned()
            .ok_or_else(|| Error::CardNameNotFound(name.to_string()))
    }

    fn monster_ids(&self) -> Result<BTreeSet<CardId>> {
        Ok(self
            .cards
            .values()
            .filter(|c| c.is_monster())
            .map(|c| c.id)
            .collect())
    }

    fn monsters_by_attribute_or_race(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        Ok(self.collect_sorted(|c| {
            c.is_monster() && (attributes.contains(&c.attribute) || races.contains(&c.race))
        }))
    }

    fn monsters_excluding(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        Ok(self.collect_sorted(|c| {
            c.is_monster() && !attributes.contains(&c.attribute) && !races.contains(&c.race)
        }))
    }

    fn spells_and_traps(&self) -> Result<Vec<Card>> {
        Ok(self.collect_sorted(|c| c.type_flags.is_spell_or_trap()))
    }
}

impl CatalogSource for Arc<MemoryCatalog> {
    type Catalog = Arc<MemoryCatalog>;

    fn open(&self) -> Result<Self::Catalog> {
        Ok(Arc::clone(self))
    }
}
