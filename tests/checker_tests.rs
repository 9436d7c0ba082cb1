//! Deck checking against an indexed domain.

mod common;

use std::sync::Arc;

use dm_domains::cards::{CardId, MemoryCatalog};
use dm_domains::core::Error;
use dm_domains::domain::{Deck, DeckChecker, DeckIssue, DeckVerdict};
use dm_domains::lookup::ReverseIndex;

use common::*;

const MASTER: u32 = 100;
const GARNET: u32 = 400;
const FUSION: u32 = 600;
const ALT_ART: u32 = 2001;

/// Twin Keeper and friends, 58 plain EARTH Warriors, a spell, an
/// off-domain Gem-Knight and an alternate artwork of the first Warrior.
fn catalog() -> Arc<MemoryCatalog> {
    let mut cards = three_monsters();
    for n in 1..=58 {
        cards.push(
            monster(1000 + n, &format!("Earth Soldier {n}"))
                .with_attribute(EARTH)
                .with_race(WARRIOR),
        );
    }
    cards.push(
        monster(GARNET, "Gem-Knight Garnet")
            .with_attribute(FIRE)
            .with_race(ROCK)
            .with_archetypes(&[GEM_KNIGHT]),
    );
    cards.push(spell(FUSION, "Brilliant Fusion"));
    cards.push(
        monster(ALT_ART, "Earth Soldier 1")
            .with_attribute(EARTH)
            .with_race(WARRIOR)
            .with_alias(CardId::new(1001)),
    );
    Arc::new(MemoryCatalog::from_cards(cards))
}

fn indexed(catalog: &Arc<MemoryCatalog>) -> ReverseIndex {
    let mut index = ReverseIndex::open_in_memory().unwrap();
    index.rebuild(catalog, &context(), 4).unwrap();
    index
}

/// 60 cards: both named monsters and every Earth Soldier.
fn valid_deck() -> Deck {
    let mut main = vec![CardId::new(200), CardId::new(300)];
    main.extend((1001..=1058).map(CardId::new));
    Deck::new(main, Vec::new(), vec![CardId::new(MASTER)])
}

fn replace_main(deck: &mut Deck, from: u32, to: u32) {
    let slot = deck
        .main
        .iter_mut()
        .find(|id| **id == CardId::new(from))
        .unwrap();
    *slot = CardId::new(to);
}

#[test]
fn test_valid_deck() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let verdict = checker.check(&valid_deck()).unwrap();
    assert_eq!(verdict, DeckVerdict::Valid);
    assert_eq!(verdict.to_string(), "Deck is valid!");
}

/// Spells in the main deck are never checked against the domain.
#[test]
fn test_spells_pass_domain_check() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    replace_main(&mut deck, 1058, FUSION);
    assert!(checker.check(&deck).unwrap().is_valid());
}

#[test]
fn test_wrong_main_deck_size() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    deck.main.pop();
    assert_eq!(
        checker.check(&deck).unwrap(),
        DeckVerdict::Invalid(DeckIssue::MainDeckSize(59))
    );
}

/// An alternate artwork counts as a copy of its original.
#[test]
fn test_alternate_artwork_is_a_duplicate() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    replace_main(&mut deck, 1058, ALT_ART);

    let verdict = checker.check(&deck).unwrap();
    assert_eq!(
        verdict,
        DeckVerdict::Invalid(DeckIssue::Duplicates(vec!["Earth Soldier 1".to_string()]))
    );
    assert_eq!(verdict.to_string(), "Duplicates found:\nEarth Soldier 1");
}

/// The Deck Master in the side deck counts towards the singleton rule.
#[test]
fn test_master_in_main_deck_is_a_duplicate() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    replace_main(&mut deck, 1058, MASTER);
    assert_eq!(
        checker.check(&deck).unwrap(),
        DeckVerdict::Invalid(DeckIssue::Duplicates(vec!["Twin Keeper".to_string()]))
    );
}

#[test]
fn test_master_must_be_a_monster() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    deck.side = vec![CardId::new(FUSION)];

    let verdict = checker.check(&deck).unwrap();
    assert_eq!(
        verdict,
        DeckVerdict::Invalid(DeckIssue::MasterNotMonster(CardId::new(FUSION)))
    );
    assert_eq!(verdict.to_string(), "Deck Master is not a monster card.");
}

#[test]
fn test_monster_outside_domain() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    replace_main(&mut deck, 1058, GARNET);

    let verdict = checker.check(&deck).unwrap();
    assert_eq!(
        verdict,
        DeckVerdict::Invalid(DeckIssue::OutsideDomain(vec!["Gem-Knight Garnet".to_string()]))
    );
    assert_eq!(
        verdict.to_string(),
        "Monsters outside of Domain found:\nGem-Knight Garnet"
    );
}

/// Extra deck monsters are held to the same domain.
#[test]
fn test_extra_deck_outside_domain() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    deck.extra.push(CardId::new(GARNET));
    assert!(matches!(
        checker.check(&deck).unwrap(),
        DeckVerdict::Invalid(DeckIssue::OutsideDomain(_))
    ));
}

/// The domain comes from the index; an unindexed master is an error, not a verdict.
#[test]
fn test_unindexed_master_is_an_error() {
    let catalog = catalog();
    let index = ReverseIndex::open_in_memory().unwrap();
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let err = checker.check(&valid_deck()).unwrap_err();
    assert!(matches!(err, Error::NotIndexed(id) if id == CardId::new(MASTER)));
}

#[test]
fn test_unknown_card_is_an_error() {
    let catalog = catalog();
    let index = indexed(&catalog);
    let ctx = context();
    let checker = DeckChecker::new(catalog.as_ref(), &index, &ctx.reference.archetypes);

    let mut deck = valid_deck();
    replace_main(&mut deck, 1058, 9999);
    let err = checker.check(&deck).unwrap_err();
    assert!(err.is_not_found());
}

/// Decks arrive as JSON passcode lists.
#[test]
fn test_deck_from_json() {
    let deck: Deck =
        serde_json::from_str(r#"{"main": [1, 2], "extra": [], "side": [100]}"#).unwrap();
    assert_eq!(deck.main, vec![CardId::new(1), CardId::new(2)]);
    assert_eq!(deck.side, vec![CardId::new(MASTER)]);
}
