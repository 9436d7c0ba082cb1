//! Card catalog backed by an EDOPro-style card database.
//!
//! The database has a `datas` table (numbers: type, stats, race,
//! attribute, packed setcode, alias) and a `texts` table (name and
//! description), joined on `id`.
//!
//! About the `type` predicates used below:
//! - `type & 1 = 1` means the card is a monster
//! - `type & 16384 = 0` filters out tokens, which are monsters too
//!
//! Alternate artworks are often stored with `setcode = 0`; they read the
//! setcode of the card they alias instead. Races above 32 bits (anime-only
//! races) are not supported: such monsters are left out of every scan and
//! are not found by lookups.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};

use crate::core::{Error, Result, SetCode};

use super::catalog::{CardCatalog, CatalogSource};
use super::definition::{Card, CardId, TypeFlags};

const CARD_COLUMNS: &str = "datas.id, datas.alias, \
     CASE WHEN datas.setcode = 0 AND datas.alias != 0 \
         THEN (SELECT d2.setcode FROM datas d2 WHERE d2.id = datas.alias) \
         ELSE datas.setcode END, \
     datas.atk, datas.def, datas.race, datas.attribute, texts.name, texts.desc, datas.type \
     FROM datas JOIN texts ON datas.id = texts.id";

const IS_MONSTER: &str =
    "datas.type & 1 = 1 AND datas.type & 16384 = 0 AND datas.race BETWEEN 0 AND 4294967295";
const IS_SPELL_OR_TRAP: &str = "datas.type & 1 = 0 AND datas.type & 16384 = 0";

/// Read-only catalog over a card database.
#[derive(Debug)]
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open a card database read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening card database {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection.
    #[must_use]
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// `None` for a card whose race doesn't fit in 32 bits.
    fn row_to_card(row: &Row<'_>) -> rusqlite::Result<Option<Card>> {
        let id = CardId::new(row.get::<_, i64>(0)? as u32);
        let raw_race: i64 = row.get(5)?;
        let Ok(race) = u32::try_from(raw_race) else {
            warn!("Skipping card [{}]: unsupported race {:#x}", id, raw_race);
            return Ok(None);
        };

        let setcode: Option<i64> = row.get(2)?;
        let type_bits: i64 = row.get(9)?;
        Ok(Some(Card {
            id,
            alias: CardId::new(row.get::<_, i64>(1)? as u32),
            setcode: SetCode::from_packed(setcode.unwrap_or_default() as u64),
            attack: row.get::<_, i64>(3)? as i32,
            defense: row.get::<_, i64>(4)? as i32,
            race,
            attribute: row.get::<_, i64>(6)? as u32,
            name: row.get(7)?,
            description: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            type_flags: TypeFlags::new(type_bits as u32),
        }))
    }

    fn query_cards<P>(&self, sql: &str, params: P) -> Result<Vec<Card>>
    where
        P: rusqlite::Params,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let cards = stmt
            .query_map(params, Self::row_to_card)?
            .filter_map(|card| card.transpose())
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    fn query_card<P>(&self, sql: &str, params: P) -> Result<Option<Card>>
    where
        P: rusqlite::Params,
    {
        let card = self
            .conn
            .query_row(sql, params, Self::row_to_card)
            .optional()?;
        Ok(card.flatten())
    }

    fn attribute_race_query(
        &self,
        predicate: &str,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} WHERE {IS_MONSTER} AND {} ORDER BY datas.id",
            predicate
                .replacen("{attributes}", &placeholders(attributes.len()), 1)
                .replacen("{races}", &placeholders(races.len()), 1)
        );
        self.query_cards(&sql, params_from_iter(attributes.iter().chain(races.iter())))
    }
}

/// `?,?,?` with `n` markers. SQLite accepts an empty `IN ()` list.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

impl CardCatalog for SqliteCatalog {
    fn card_by_id(&self, id: CardId) -> Result<Card> {
        let sql = format!("SELECT {CARD_COLUMNS} WHERE datas.id = ?1");
        self.query_card(&sql, [id.raw()])?
            .ok_or(Error::CardIdNotFound(id))
    }

    fn card_by_name(&self, name: &str) -> Result<Card> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} WHERE texts.name = ?1 COLLATE NOCASE ORDER BY datas.id LIMIT 1"
        );
        self.query_card(&sql, [name])?
            .ok_or_else(|| Error::CardNameNotFound(name.to_string()))
    }

    fn monster_ids(&self) -> Result<BTreeSet<CardId>> {
        let sql = format!("SELECT id FROM datas WHERE {IS_MONSTER}");
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .map(|id| id.map(|id| CardId::new(id as u32)))
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(ids)
    }

    fn monsters_by_attribute_or_race(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        self.attribute_race_query(
            "(datas.attribute IN ({attributes}) OR datas.race IN ({races}))",
            attributes,
            races,
        )
    }

    fn monsters_excluding(
        &self,
        attributes: &BTreeSet<u32>,
        races: &BTreeSet<u32>,
    ) -> Result<Vec<Card>> {
        self.attribute_race_query(
            "datas.attribute NOT IN ({attributes}) AND datas.race NOT IN ({races})",
            attributes,
            races,
        )
    }

    fn spells_and_traps(&self) -> Result<Vec<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} WHERE {IS_SPELL_OR_TRAP} ORDER BY datas.id");
        self.query_cards(&sql, params![])
    }
}

/// Opens a fresh read-only connection per worker.
#[derive(Clone, Debug)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for SqliteSource {
    type Catalog = SqliteCatalog;

    fn open(&self) -> Result<SqliteCatalog> {
        SqliteCatalog::open(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE datas (id INTEGER PRIMARY KEY, ot INTEGER, alias INTEGER, setcode INTEGER,
            type INTEGER, atk INTEGER, def INTEGER, level INTEGER, race INTEGER,
            attribute INTEGER, category INTEGER);
        CREATE TABLE texts (id INTEGER PRIMARY KEY, name TEXT, desc TEXT);
    ";

    fn insert(conn: &Connection, id: u32, name: &str, type_bits: u32, attribute: u32, race: u64, setcode: u64) {
        insert_alias(conn, id, 0, name, type_bits, attribute, race, setcode);
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_alias(
        conn: &Connection,
        id: u32,
        alias: u32,
        name: &str,
        type_bits: u32,
        attribute: u32,
        race: u64,
        setcode: u64,
    ) {
        conn.execute(
            "INSERT INTO datas (id, ot, alias, setcode, type, atk, def, level, race, attribute, category)
             VALUES (?1, 3, ?2, ?3, ?4, 1000, 1000, 4, ?5, ?6, 0)",
            rusqlite::params![id, alias, setcode as i64, type_bits, race as i64, attribute],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO texts (id, name, desc) VALUES (?1, ?2, '')",
            rusqlite::params![id, name],
        )
        .unwrap();
    }

    fn sample() -> SqliteCatalog {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        insert(&conn, 1, "Gem-Knight Garnet", 0x11, 0x4, 0x10, 0x1047);
        insert(&conn, 2, "Gem-Knight Sapphire", 0x11, 0x2, 0x20, 0x1047);
        insert(&conn, 3, "Pot of Greed", 0x2, 0, 0, 0);
        insert(&conn, 4, "Sheep Token", 0x4011, 0x1, 0x10, 0);
        insert_alias(&conn, 5, 1, "Gem-Knight Garnet", 0x11, 0x4, 0x10, 0);
        insert(&conn, 6, "Anime Beast", 0x21, 0x1, 1 << 33, 0);
        SqliteCatalog::from_connection(conn)
    }

    #[test]
    fn test_card_by_id_decodes_setcode() {
        let catalog = sample();
        let card = catalog.card_by_id(CardId::new(1)).unwrap();
        assert_eq!(card.name, "Gem-Knight Garnet");
        assert_eq!(card.archetype_codes().as_slice(), &[0x1047]);
        assert!(card.is_monster());
        assert!(card.is_normal());
    }

    #[test]
    fn test_missing_card_is_not_found() {
        let catalog = sample();
        let err = catalog.card_by_id(CardId::new(99)).unwrap_err();
        assert!(err.is_not_found());
        let err = catalog.card_by_name("Nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        let catalog = sample();
        assert_eq!(catalog.card_by_name("POT OF GREED").unwrap().id, CardId::new(3));
    }

    #[test]
    fn test_monster_ids_skip_tokens_and_spells() {
        let catalog = sample();
        let ids: Vec<_> = catalog.monster_ids().unwrap().into_iter().collect();
        assert_eq!(ids, vec![CardId::new(1), CardId::new(2), CardId::new(5)]);
    }

    #[test]
    fn test_alternate_artwork_reads_original_setcode() {
        let catalog = sample();
        let alt = catalog.card_by_id(CardId::new(5)).unwrap();
        assert_eq!(alt.original_id(), CardId::new(1));
        assert_eq!(alt.archetype_codes().as_slice(), &[0x1047]);
    }

    #[test]
    fn test_wide_race_is_skipped() {
        let catalog = sample();
        assert!(!catalog.monster_ids().unwrap().contains(&CardId::new(6)));
        assert!(catalog.card_by_id(CardId::new(6)).unwrap_err().is_not_found());
        let everything = catalog
            .monsters_excluding(&BTreeSet::new(), &BTreeSet::new())
            .unwrap();
        assert!(everything.iter().all(|card| card.id != CardId::new(6)));
    }

    #[test]
    fn test_attribute_race_partition() {
        let catalog = sample();
        let attrs = BTreeSet::from([0x4]);
        let races = BTreeSet::from([0x20]);

        let inside = catalog.monsters_by_attribute_or_race(&attrs, &races).unwrap();
        assert_eq!(inside.len(), 3);

        let outside = catalog.monsters_excluding(&attrs, &BTreeSet::new()).unwrap();
        assert_eq!(outside.len(), 1);
        assert_eq!(outside[0].id, CardId::new(2));
    }

    #[test]
    fn test_spells_and_traps() {
        let catalog = sample();
        let spells = catalog.spells_and_traps().unwrap();
        assert_eq!(spells.len(), 1);
        assert_eq!(spells[0].name, "Pot of Greed");
    }
}
