//! The reverse index.
//!
//! Answers "which Deck Masters admit this card?" from precomputed rows
//! instead of re-parsing every Deck Master's text per query.
//!
//! Rebuilds are additive: only Deck Masters missing from the index are
//! built, on a pool of workers that each open their own catalog, and the
//! results are written in one transaction once every worker is done. A
//! failed worker means nothing from the batch is written.

use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::cards::{Card, CardCatalog, CardId, CatalogSource};
use crate::core::{Error, Result, MAX_REBUILD_WORKERS};
use crate::domain::{Domain, DomainContext, DomainRows};
use crate::reference::ArchetypeHierarchy;

use super::schema::{
    self, ARCHETYPE_TABLE, ATTRIBUTE_TABLE, MASTER_TABLE, MENTION_TABLE, RACE_TABLE, STAT_TABLE,
};

/// Counts from one `rebuild`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Monsters that had no domain in the index.
    pub missing: usize,
    /// Domains written.
    pub inserted: usize,
    /// Missing ids the catalog could no longer find.
    pub skipped: usize,
}

/// Persisted domain rows for every Deck Master.
#[derive(Debug)]
pub struct ReverseIndex {
    conn: Connection,
}

impl ReverseIndex {
    /// Open (or create) the index at `path`, creating its folder if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!("Setting up lookup database at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        schema::create(&conn)?;
        Ok(Self { conn })
    }

    /// Ids of every indexed Deck Master.
    pub fn master_ids(&self) -> Result<BTreeSet<CardId>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id FROM {MASTER_TABLE} ORDER BY id"))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, u32>(0))?
            .map(|id| id.map(CardId::new))
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(ids)
    }

    /// Build and store the domain of every monster not yet indexed.
    ///
    /// The missing ids are split into at most `workers` chunks (clamped to
    /// 1..=8). Each chunk runs on its own rayon task with its own catalog
    /// from `source`. The index is written once, after every chunk has
    /// finished; if any chunk fails the whole batch is dropped and
    /// `Error::RebuildFailed` is returned.
    pub fn rebuild<S>(
        &mut self,
        source: &S,
        ctx: &DomainContext,
        workers: usize,
    ) -> Result<RebuildReport>
    where
        S: CatalogSource,
    {
        let all_monsters = source.open()?.monster_ids()?;
        let indexed = self.master_ids()?;
        let missing: Vec<CardId> = all_monsters.difference(&indexed).copied().collect();

        if missing.is_empty() {
            info!("Lookup database is up to date");
            return Ok(RebuildReport::default());
        }

        let chunks = partition(&missing, workers);
        info!(
            "Updating lookup database: {} missing domains across {} workers",
            missing.len(),
            chunks.len()
        );

        let results: Vec<Result<(Vec<Domain>, usize)>> = chunks
            .par_iter()
            .map(|chunk| build_chunk(source, ctx, chunk))
            .collect();

        let mut domains = Vec::with_capacity(missing.len());
        let mut skipped = 0;
        for result in results {
            let (built, chunk_skipped) = result.map_err(|err| Error::RebuildFailed(Box::new(err)))?;
            domains.extend(built);
            skipped += chunk_skipped;
        }

        let inserted = self.insert_domains(&domains)?;
        info!("Lookup database updated: {} domains added", inserted);

        Ok(RebuildReport {
            missing: missing.len(),
            inserted,
            skipped,
        })
    }

    /// Store domains in one transaction. Rows already present are left
    /// alone. Returns how many Deck Masters were new.
    pub fn insert_domains(&mut self, domains: &[Domain]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut master =
                tx.prepare(&format!("INSERT OR IGNORE INTO {MASTER_TABLE} (id) VALUES (?1)"))?;
            let mut attribute = tx.prepare(&insert_value_sql(ATTRIBUTE_TABLE))?;
            let mut race = tx.prepare(&insert_value_sql(RACE_TABLE))?;
            let mut archetype = tx.prepare(&insert_value_sql(ARCHETYPE_TABLE))?;
            let mut mention = tx.prepare(&insert_value_sql(MENTION_TABLE))?;
            let mut stat = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {STAT_TABLE} (master_id, atk, def) VALUES (?1, ?2, ?3)"
            ))?;

            for domain in domains {
                let id = domain.master.id.raw();
                inserted += master.execute(params![id])?;

                for value in &domain.attributes {
                    attribute.execute(params![id, value])?;
                }
                for value in &domain.races {
                    race.execute(params![id, value])?;
                }
                for value in &domain.archetypes {
                    archetype.execute(params![id, value])?;
                }
                for value in &domain.named_cards {
                    mention.execute(params![id, value])?;
                }
                for (atk, def) in &domain.battle_stats {
                    stat.execute(params![id, atk, def])?;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Every Deck Master whose stored rules admit `card`.
    ///
    /// The same test as `Domain::in_domain`, run as one query: attribute,
    /// race, lowercase name, exact stats, or any base archetype of the
    /// card's archetype codes.
    pub fn filter(&self, card: &Card, hierarchy: &ArchetypeHierarchy) -> Result<BTreeSet<CardId>> {
        let mut sql = format!(
            "SELECT id FROM {MASTER_TABLE} WHERE \
             {} OR {} OR {} OR \
             EXISTS (SELECT 1 FROM {STAT_TABLE} WHERE {STAT_TABLE}.master_id = {MASTER_TABLE}.id \
             AND {STAT_TABLE}.atk = ? AND {STAT_TABLE}.def = ?)",
            exists_value_sql(ATTRIBUTE_TABLE),
            exists_value_sql(RACE_TABLE),
            exists_value_sql(MENTION_TABLE),
        );
        let mut args = vec![
            Value::Integer(i64::from(card.attribute)),
            Value::Integer(i64::from(card.race)),
            Value::Text(card.name.to_lowercase()),
            Value::Integer(i64::from(card.attack)),
            Value::Integer(i64::from(card.defense)),
        ];

        for base in hierarchy.resolve_all(card.archetype_codes()) {
            sql.push_str(" OR ");
            sql.push_str(&exists_value_sql(ARCHETYPE_TABLE));
            args.push(Value::Integer(i64::from(base)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(args), |row| row.get::<_, u32>(0))?
            .map(|id| id.map(CardId::new))
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        debug!("[{}] fits {} domains", card.name, ids.len());
        Ok(ids)
    }

    /// Deck Masters whose domain admits every monster in `cards`.
    ///
    /// Spells and traps are ignored. No monsters means no candidates.
    pub fn reverse_search(
        &self,
        cards: &[Card],
        hierarchy: &ArchetypeHierarchy,
    ) -> Result<BTreeSet<CardId>> {
        let mut candidates: Option<BTreeSet<CardId>> = None;

        for card in cards.iter().filter(|c| c.is_monster()) {
            let fits = self.filter(card, hierarchy)?;
            let narrowed = match candidates {
                Some(previous) => previous.intersection(&fits).copied().collect(),
                None => fits,
            };
            let done = narrowed.is_empty();
            candidates = Some(narrowed);
            if done {
                break;
            }
        }

        Ok(candidates.unwrap_or_default())
    }

    /// The stored rule set of one Deck Master, or `None` if it isn't indexed.
    pub fn domain_rows(&self, id: CardId) -> Result<Option<DomainRows>> {
        let indexed = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {MASTER_TABLE} WHERE id = ?1"),
                [id.raw()],
                |_| Ok(()),
            )
            .optional()?;
        if indexed.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT atk, def FROM {STAT_TABLE} WHERE master_id = ?1"
        ))?;
        let battle_stats = stmt
            .query_map([id.raw()], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, i32>(1)?)))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;

        Ok(Some(DomainRows {
            attributes: self.values(ATTRIBUTE_TABLE, id)?,
            races: self.values(RACE_TABLE, id)?,
            archetypes: self.values(ARCHETYPE_TABLE, id)?,
            named_cards: self.values(MENTION_TABLE, id)?,
            battle_stats,
        }))
    }

    /// Rebuild `master`'s domain from its stored rows.
    pub fn load_domain(&self, master: Card) -> Result<Domain> {
        match self.domain_rows(master.id)? {
            Some(rows) => Ok(Domain::from_data(master, rows)),
            None => Err(Error::NotIndexed(master.id)),
        }
    }

    /// Every indexed Deck Master with its rows, by id.
    pub fn snapshot(&self) -> Result<Vec<(CardId, DomainRows)>> {
        self.master_ids()?
            .into_iter()
            .map(|id| -> Result<(CardId, DomainRows)> {
                Ok((id, self.domain_rows(id)?.unwrap_or_default()))
            })
            .collect()
    }

    fn values<T>(&self, table: &str, id: CardId) -> Result<BTreeSet<T>>
    where
        T: FromSql + Ord,
    {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT value FROM {table} WHERE master_id = ?1"))?;
        let values = stmt
            .query_map([id.raw()], |row| row.get::<_, T>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(values)
    }
}

fn insert_value_sql(table: &str) -> String {
    format!("INSERT OR IGNORE INTO {table} (master_id, value) VALUES (?1, ?2)")
}

fn exists_value_sql(table: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM {table} WHERE {table}.master_id = {MASTER_TABLE}.id AND {table}.value = ?)"
    )
}

/// Split `ids` into at most `workers` (clamped to 1..=8) near-equal chunks.
fn partition(ids: &[CardId], workers: usize) -> Vec<&[CardId]> {
    if ids.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, MAX_REBUILD_WORKERS).min(ids.len());
    let size = ids.len().div_ceil(workers);
    ids.chunks(size).collect()
}

/// Build the domains of one chunk with a catalog of its own.
fn build_chunk<S>(source: &S, ctx: &DomainContext, ids: &[CardId]) -> Result<(Vec<Domain>, usize)>
where
    S: CatalogSource,
{
    let catalog = source.open()?;
    let mut domains = Vec::with_capacity(ids.len());
    let mut skipped = 0;

    for &id in ids {
        match catalog.monster_by_id(id) {
            Ok(master) => domains.push(Domain::from_card(master, ctx, &catalog)?),
            Err(err) if err.is_not_found() => {
                warn!("Could not find card with id [{}]", id);
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok((domains, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u32) -> Vec<CardId> {
        (1..=n).map(CardId::new).collect()
    }

    #[test]
    fn test_partition_caps_at_eight() {
        let ids = ids(100);
        let chunks = partition(&ids, 32);
        assert_eq!(chunks.len(), 8);
        assert_eq!(chunks.iter().map(|c| c.len()).sum::<usize>(), 100);
    }

    #[test]
    fn test_partition_small_sets() {
        let ids = ids(3);
        assert_eq!(partition(&ids, 8).len(), 3);
        assert_eq!(partition(&ids, 0).len(), 1);
        assert!(partition(&[], 8).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = ReverseIndex::open_in_memory().unwrap();
        assert!(index.master_ids().unwrap().is_empty());
        assert_eq!(index.domain_rows(CardId::new(1)).unwrap(), None);
    }

    #[test]
    fn test_load_domain_requires_row() {
        let index = ReverseIndex::open_in_memory().unwrap();
        let err = index
            .load_domain(Card::new(CardId::new(9), "Nobody"))
            .unwrap_err();
        assert!(matches!(err, Error::NotIndexed(id) if id == CardId::new(9)));
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut index = ReverseIndex::open_in_memory().unwrap();
        let rows = DomainRows {
            attributes: BTreeSet::from([0x10, 0x40]),
            races: BTreeSet::from([0x100]),
            archetypes: BTreeSet::from([0x47]),
            named_cards: BTreeSet::from(["gem-knight lazuli".to_string()]),
            battle_stats: BTreeSet::from([(1900, 1800)]),
        };
        let domain = Domain::from_data(Card::new(CardId::new(1), "Master"), rows.clone());

        assert_eq!(index.insert_domains(&[domain.clone()]).unwrap(), 1);
        assert_eq!(index.insert_domains(&[domain]).unwrap(), 0);
        assert_eq!(index.domain_rows(CardId::new(1)).unwrap(), Some(rows));
    }
}
