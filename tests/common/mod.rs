//! Shared fixtures: small reference texts, card builders, a card database writer.

#![allow(dead_code)]

use std::path::Path;

use rusqlite::{params, Connection};

use dm_domains::cards::{Card, CardId, TypeFlags};
use dm_domains::core::{ArchetypeOverrides, ParserConfig};
use dm_domains::domain::DomainContext;
use dm_domains::reference::Reference;

pub const EARTH: u32 = 0x01;
pub const WATER: u32 = 0x02;
pub const FIRE: u32 = 0x04;
pub const LIGHT: u32 = 0x10;
pub const DARK: u32 = 0x20;
pub const DIVINE_ATTRIBUTE: u32 = 0x40;

pub const WARRIOR: u32 = 0x1;
pub const SPELLCASTER: u32 = 0x2;
pub const FIEND: u32 = 0x8;
pub const AQUA: u32 = 0x40;
pub const ROCK: u32 = 0x100;
pub const BEAST_WARRIOR: u32 = 0x8000;
pub const DIVINE_RACE: u32 = 0x20_0000;

pub const GEM: u16 = 0x47;
pub const GEM_KNIGHT: u16 = 0x1047;
pub const MAGICIAN: u16 = 0x98;

pub const RELEASED: &str = "\
#Official Archetypes
!setname 0x47 Gem-
!setname 0x1047 Gem-Knight
!setname 0x98 Magician
!setname 0x10db Supreme King Gate
";

pub const PRE_RELEASE: &str = "\
#Official archetypes

#Pre-release archetypes
!setname 0x300 Brand New
";

pub const ATTR_RACES: &str = "\
--constants
//Attributes
#define ATTRIBUTE_EARTH\t\t0x01
#define ATTRIBUTE_WATER\t\t0x02
#define ATTRIBUTE_FIRE\t\t0x04
#define ATTRIBUTE_WIND\t\t0x08
#define ATTRIBUTE_LIGHT\t\t0x10
#define ATTRIBUTE_DARK\t\t0x20
#define ATTRIBUTE_DIVINE\t0x40

//Races
#define RACE_WARRIOR\t\t0x1
#define RACE_SPELLCASTER\t0x2
#define RACE_FAIRY\t\t0x4
#define RACE_FIEND\t\t0x8
#define RACE_ZOMBIE\t\t0x10
#define RACE_MACHINE\t\t0x20
#define RACE_AQUA\t\t0x40
#define RACE_PYRO\t\t0x80
#define RACE_ROCK\t\t0x100
#define RACE_WINGEDBEAST\t0x200
#define RACE_DRAGON\t\t0x2000
#define RACE_BEAST\t\t0x4000
#define RACE_BEASTWARRIOR\t0x8000
#define RACE_DIVINE\t\t0x200000
";

pub fn reference() -> Reference {
    Reference::from_texts(RELEASED, PRE_RELEASE, ATTR_RACES, &ArchetypeOverrides::default())
}

pub fn context() -> DomainContext {
    DomainContext::new(reference(), &ParserConfig::default())
}

/// An effect monster with no stats, attribute or race yet.
pub fn monster(id: u32, name: &str) -> Card {
    Card::new(CardId::new(id), name).with_type(TypeFlags::MONSTER | TypeFlags::EFFECT)
}

pub fn vanilla(id: u32, name: &str) -> Card {
    Card::new(CardId::new(id), name).with_type(TypeFlags::MONSTER | TypeFlags::NORMAL)
}

pub fn spell(id: u32, name: &str) -> Card {
    Card::new(CardId::new(id), name).with_type(TypeFlags::SPELL)
}

/// One Deck Master naming two monsters that share nothing else with it.
pub fn three_monsters() -> Vec<Card> {
    vec![
        monster(100, "Twin Keeper")
            .with_attribute(EARTH)
            .with_race(WARRIOR)
            .with_stats(1500, 1200)
            .with_description(r#"If you control "Shadow Courier" or "Tide Runner", draw 1 card."#),
        monster(200, "Shadow Courier")
            .with_attribute(DARK)
            .with_race(FIEND)
            .with_stats(800, 600),
        monster(300, "Tide Runner")
            .with_attribute(WATER)
            .with_race(AQUA)
            .with_stats(1100, 900),
    ]
}

const CDB_SCHEMA: &str = "
    CREATE TABLE datas (id INTEGER PRIMARY KEY, ot INTEGER, alias INTEGER, setcode INTEGER,
        type INTEGER, atk INTEGER, def INTEGER, level INTEGER, race INTEGER,
        attribute INTEGER, category INTEGER);
    CREATE TABLE texts (id INTEGER PRIMARY KEY, name TEXT, desc TEXT);
";

/// Write `cards` to a fresh card database at `path`.
pub fn write_cdb(path: &Path, cards: &[Card]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(CDB_SCHEMA).unwrap();
    for card in cards {
        conn.execute(
            "INSERT INTO datas (id, ot, alias, setcode, type, atk, def, level, race, attribute, category)
             VALUES (?1, 3, ?2, ?3, ?4, ?5, ?6, 4, ?7, ?8, 0)",
            params![
                card.id.raw(),
                card.alias.raw(),
                card.setcode.to_packed() as i64,
                card.type_flags.bits(),
                card.attack,
                card.defense,
                card.race,
                card.attribute,
            ],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO texts (id, name, desc) VALUES (?1, ?2, ?3)",
            params![card.id.raw(), card.name, card.description],
        )
        .unwrap();
    }
}
