//! Deck legality for the Deck Master format.
//!
//! A deck is valid when it has the right size, holds every card at most
//! once, and every monster in the main and extra deck sits inside the
//! domain of the Deck Master placed in the side deck. Decoding deck
//! files is someone else's job; the checker takes plain id lists.

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardId};
use crate::core::{Error, Result};
use crate::lookup::ReverseIndex;
use crate::reference::ArchetypeHierarchy;

pub const MAIN_DECK_SIZE: usize = 60;
pub const MAX_EXTRA_DECK_SIZE: usize = 15;
pub const SIDE_DECK_SIZE: usize = 1;

/// A decoded deck.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub main: Vec<CardId>,
    pub extra: Vec<CardId>,
    /// Holds only the Deck Master.
    pub side: Vec<CardId>,
}

impl Deck {
    #[must_use]
    pub fn new(main: Vec<CardId>, extra: Vec<CardId>, side: Vec<CardId>) -> Self {
        Self { main, extra, side }
    }

    /// Every id, main then extra then side.
    pub fn all_ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.main
            .iter()
            .chain(self.extra.iter())
            .chain(self.side.iter())
            .copied()
    }
}

/// The first rule a deck breaks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckIssue {
    MainDeckSize(usize),
    ExtraDeckSize(usize),
    SideDeckSize(usize),
    /// Names (or ids, when unknown) of the cards present more than once.
    Duplicates(Vec<String>),
    MasterNotMonster(CardId),
    /// Names of the monsters outside the domain.
    OutsideDomain(Vec<String>),
}

impl fmt::Display for DeckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckIssue::MainDeckSize(_) => {
                write!(f, "Main Deck must have exactly {MAIN_DECK_SIZE} cards.")
            }
            DeckIssue::ExtraDeckSize(_) => {
                write!(f, "Extra Deck must have {MAX_EXTRA_DECK_SIZE} or less cards.")
            }
            DeckIssue::SideDeckSize(_) => write!(f, "Side Deck must contain only your Deck Master."),
            DeckIssue::Duplicates(names) => write!(f, "Duplicates found:\n{}", names.join("\n")),
            DeckIssue::MasterNotMonster(_) => write!(f, "Deck Master is not a monster card."),
            DeckIssue::OutsideDomain(names) => {
                write!(f, "Monsters outside of Domain found:\n{}", names.join("\n"))
            }
        }
    }
}

/// Result of a deck check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckVerdict {
    Valid,
    Invalid(DeckIssue),
}

impl DeckVerdict {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, DeckVerdict::Valid)
    }
}

impl fmt::Display for DeckVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckVerdict::Valid => write!(f, "Deck is valid!"),
            DeckVerdict::Invalid(issue) => write!(f, "{issue}"),
        }
    }
}

/// Checks decks against the catalog and the reverse index.
pub struct DeckChecker<'a, C: ?Sized> {
    catalog: &'a C,
    index: &'a ReverseIndex,
    hierarchy: &'a ArchetypeHierarchy,
}

impl<'a, C> DeckChecker<'a, C>
where
    C: CardCatalog + ?Sized,
{
    pub fn new(catalog: &'a C, index: &'a ReverseIndex, hierarchy: &'a ArchetypeHierarchy) -> Self {
        Self {
            catalog,
            index,
            hierarchy,
        }
    }

    /// Run every check in order and report the first rule broken.
    ///
    /// Catalog and index failures are errors, not verdicts.
    pub fn check(&self, deck: &Deck) -> Result<DeckVerdict> {
        if let Some(issue) = Self::check_card_count(deck) {
            return Ok(DeckVerdict::Invalid(issue));
        }
        if let Some(issue) = self.check_singleton(deck)? {
            return Ok(DeckVerdict::Invalid(issue));
        }
        if let Some(issue) = self.check_domain(deck)? {
            return Ok(DeckVerdict::Invalid(issue));
        }
        Ok(DeckVerdict::Valid)
    }

    #[must_use]
    pub fn check_card_count(deck: &Deck) -> Option<DeckIssue> {
        if deck.main.len() != MAIN_DECK_SIZE {
            return Some(DeckIssue::MainDeckSize(deck.main.len()));
        }
        if deck.extra.len() > MAX_EXTRA_DECK_SIZE {
            return Some(DeckIssue::ExtraDeckSize(deck.extra.len()));
        }
        if deck.side.len() != SIDE_DECK_SIZE {
            return Some(DeckIssue::SideDeckSize(deck.side.len()));
        }
        None
    }

    /// No card twice, counting alternate artworks as their original.
    pub fn check_singleton(&self, deck: &Deck) -> Result<Option<DeckIssue>> {
        let mut seen = FxHashSet::default();
        let mut duplicates = BTreeSet::new();

        for id in deck.all_ids() {
            let original = self.catalog.card_by_id(id)?.original_id();
            if !seen.insert(original) {
                duplicates.insert(original);
            }
        }

        if duplicates.is_empty() {
            return Ok(None);
        }

        let mut names = Vec::with_capacity(duplicates.len());
        for id in duplicates {
            match self.catalog.card_by_id(id) {
                Ok(card) => names.push(card.name),
                Err(err) if err.is_not_found() => names.push(format!("Card with id [{id}]")),
                Err(err) => return Err(err),
            }
        }
        Ok(Some(DeckIssue::Duplicates(names)))
    }

    /// Every main and extra deck monster must be inside the Deck Master's domain.
    ///
    /// The domain comes from the reverse index, not from re-parsing.
    pub fn check_domain(&self, deck: &Deck) -> Result<Option<DeckIssue>> {
        let Some(&master_id) = deck.side.first() else {
            return Ok(Some(DeckIssue::SideDeckSize(0)));
        };

        let master = match self.catalog.monster_by_id(master_id) {
            Ok(master) => master,
            Err(Error::NotAMonster(id)) => return Ok(Some(DeckIssue::MasterNotMonster(id))),
            Err(err) => return Err(err),
        };

        let domain = self.index.load_domain(master)?;
        debug!("Checking deck against domain of [{}]", domain.master.name);

        let mut outside = Vec::new();
        for id in deck.main.iter().chain(deck.extra.iter()) {
            let card = self.catalog.card_by_id(*id)?;
            if card.is_monster() && !domain.in_domain(&card, false, self.hierarchy) {
                outside.push(card.name);
            }
        }

        if outside.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DeckIssue::OutsideDomain(outside)))
        }
    }
}
