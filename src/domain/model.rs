//! Deck Master domains.
//!
//! A `Domain` is the rule set one Deck Master card defines: the
//! attributes, races, base archetypes, named cards and exact battle stats
//! it admits. It is either built from the Deck Master's card record
//! (`Domain::from_card`) or reconstituted from the rows the reverse index
//! stored for it (`Domain::from_data`).
//!
//! The rule set never changes after construction. `members` is a
//! separate, mutable list that the member passes fill in.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardCatalog};
use crate::core::Result;
use crate::reference::{ArchetypeHierarchy, Reference};

use super::context::DomainContext;

/// Prefix of every exported banlist title.
const IFLIST_TITLE_PREFIX: &str = "[Domain] ";
const IFLIST_EXTENSION: &str = ".iflist.conf";

/// YGOPRODeck collection import columns.
const CSV_HEADERS: [&str; 8] = [
    "cardname",
    "cardq",
    "cardrarity",
    "cardcondition",
    "card_edition",
    "cardset",
    "cardcode",
    "cardid",
];
const CSV_PREFIX: &str = "[Domain]";
const CSV_EXTENSION: &str = ".csv";

/// A domain's rule set in storable form.
///
/// This is exactly what the reverse index keeps per Deck Master.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRows {
    pub attributes: BTreeSet<u32>,
    pub races: BTreeSet<u32>,
    /// Base archetype codes only.
    pub archetypes: BTreeSet<u16>,
    /// Lowercase card names.
    pub named_cards: BTreeSet<String>,
    /// `(atk, def)` pairs.
    pub battle_stats: BTreeSet<(i32, i32)>,
}

/// The domain of one Deck Master.
///
/// ## Example
///
/// ```
/// use std::collections::BTreeSet;
///
/// use dm_domains::cards::{Card, CardId, TypeFlags};
/// use dm_domains::domain::{Domain, DomainRows};
/// use dm_domains::reference::ArchetypeHierarchy;
///
/// let master = Card::new(CardId::new(1), "Gem-Knight Master Diamond")
///     .with_type(TypeFlags::MONSTER | TypeFlags::FUSION);
/// let rows = DomainRows {
///     archetypes: BTreeSet::from([0x47]),
///     ..DomainRows::default()
/// };
/// let domain = Domain::from_data(master, rows);
///
/// let lazuli = Card::new(CardId::new(2), "Gem-Knight Lazuli")
///     .with_type(TypeFlags::MONSTER)
///     .with_archetypes(&[0x1047]);
///
/// let hierarchy = ArchetypeHierarchy::from_entries(
///     [(0x47, "Gem-"), (0x1047, "Gem-Knight")],
///     &Default::default(),
/// );
/// assert!(domain.in_domain(&lazuli, false, &hierarchy));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    /// The Deck Master card.
    pub master: Card,
    pub attributes: BTreeSet<u32>,
    pub races: BTreeSet<u32>,
    /// Base archetype codes. Never holds a sub-archetype code that
    /// resolves to something else.
    pub archetypes: BTreeSet<u16>,
    pub named_cards: BTreeSet<String>,
    pub battle_stats: BTreeSet<(i32, i32)>,
    /// Cards collected by the member passes. Not part of the rule set.
    pub members: Vec<Card>,
}

impl Domain {
    /// Build the domain of `master` from its card record.
    ///
    /// Normal (vanilla) monsters only get their own attribute, race and
    /// archetypes: their text is flavor and isn't parsed. For every other
    /// monster the description is parsed and folded in. Cards the text
    /// names pull their own archetypes into the domain as well.
    ///
    /// A named card missing from the catalog is skipped. Any other
    /// catalog error is returned.
    pub fn from_card<C>(master: Card, ctx: &DomainContext, catalog: &C) -> Result<Self>
    where
        C: CardCatalog + ?Sized,
    {
        let reference = &ctx.reference;
        let hierarchy = &reference.archetypes;

        let mut attributes = BTreeSet::from([master.attribute]);
        attributes.extend(reference.divine_attribute());
        let mut races = BTreeSet::from([master.race]);
        races.extend(reference.divine_race());

        let mut raw_codes: Vec<u16> = master.archetype_codes().to_vec();
        let mut named_cards = BTreeSet::new();
        let mut battle_stats = BTreeSet::new();

        if !master.is_normal() {
            let found = ctx.parser.extract(&master);

            named_cards.extend(found.quoted_card_names);
            for mention in found.mentions {
                match hierarchy.code_of(&mention) {
                    Some(code) => raw_codes.push(code),
                    None => {
                        named_cards.insert(mention);
                    }
                }
            }

            for name in &named_cards {
                match catalog.card_by_name(name) {
                    Ok(card) => raw_codes.extend(card.archetype_codes()),
                    Err(err) if err.is_not_found() => {
                        debug!("[{}] names [{}], which is not a card", master.name, name);
                    }
                    Err(err) => return Err(err),
                }
            }

            battle_stats = found.battle_stats;

            for race in &found.races {
                match reference.races.code(race) {
                    Some(code) => {
                        races.insert(code);
                    }
                    None => warn!("Unknown race [{}] in [{}]", race, master.name),
                }
            }
            for attribute in &found.attributes {
                match reference.attributes.code(attribute) {
                    Some(code) => {
                        attributes.insert(code);
                    }
                    None => warn!("Unknown attribute [{}] in [{}]", attribute, master.name),
                }
            }
        }

        let archetypes = hierarchy.resolve_all(raw_codes).into_iter().collect();

        Ok(Self {
            master,
            attributes,
            races,
            archetypes,
            named_cards,
            battle_stats,
            members: Vec::new(),
        })
    }

    /// Reconstitute a domain from stored rows. No parsing happens.
    #[must_use]
    pub fn from_data(master: Card, rows: DomainRows) -> Self {
        Self {
            master,
            attributes: rows.attributes,
            races: rows.races,
            archetypes: rows.archetypes,
            named_cards: rows.named_cards,
            battle_stats: rows.battle_stats,
            members: Vec::new(),
        }
    }

    /// The rule set in storable form.
    #[must_use]
    pub fn rows(&self) -> DomainRows {
        DomainRows {
            attributes: self.attributes.clone(),
            races: self.races.clone(),
            archetypes: self.archetypes.clone(),
            named_cards: self.named_cards.clone(),
            battle_stats: self.battle_stats.clone(),
        }
    }

    /// Does this domain admit `card`?
    ///
    /// Checks, in order: attribute or race (unless `skip_attribute_race`),
    /// exact name, exact battle stats, then the card's archetypes resolved
    /// to their bases. Pass `skip_attribute_race` when the candidates were
    /// already filtered by attribute and race.
    #[must_use]
    pub fn in_domain(
        &self,
        card: &Card,
        skip_attribute_race: bool,
        hierarchy: &ArchetypeHierarchy,
    ) -> bool {
        if !skip_attribute_race
            && (self.attributes.contains(&card.attribute) || self.races.contains(&card.race))
        {
            return true;
        }

        if self.named_cards.contains(&card.name.to_lowercase()) {
            return true;
        }

        if self.battle_stats.contains(&(card.attack, card.defense)) {
            return true;
        }

        card.archetype_codes().into_iter().any(|code| {
            hierarchy
                .resolve_base(code)
                .iter()
                .any(|base| self.archetypes.contains(base))
        })
    }

    /// Replace `members` with every card of the catalog this domain admits.
    ///
    /// Monsters sharing an attribute or race go in without further
    /// checks. The rest are tested by name, stats and archetype. Spells
    /// and traps are appended unchecked when `include_spells_traps` is
    /// set. Returns the new member count.
    pub fn collect_members<C>(
        &mut self,
        catalog: &C,
        hierarchy: &ArchetypeHierarchy,
        include_spells_traps: bool,
    ) -> Result<usize>
    where
        C: CardCatalog + ?Sized,
    {
        let mut members = catalog.monsters_by_attribute_or_race(&self.attributes, &self.races)?;

        for card in catalog.monsters_excluding(&self.attributes, &self.races)? {
            if self.in_domain(&card, true, hierarchy) {
                members.push(card);
            }
        }

        if include_spells_traps {
            members.extend(catalog.spells_and_traps()?);
        }

        debug!("[{}] admits {} cards", self.master.name, members.len());
        self.members = members;
        Ok(self.members.len())
    }

    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Keep only the monster members.
    pub fn remove_spells_and_traps(&mut self) {
        self.members.retain(Card::is_monster);
    }

    /// Render the rule set by name, one rule kind per line.
    ///
    /// Codes the reference tables don't know are printed in hex.
    #[must_use]
    pub fn describe(&self, reference: &Reference) -> String {
        let attributes = named_list(self.attributes.iter(), |c| reference.attributes.name(*c));
        let races = named_list(self.races.iter(), |c| reference.races.name(*c));
        let archetypes = named_list(self.archetypes.iter(), |c| reference.archetypes.name_of(*c));

        let stats: Vec<String> = self
            .battle_stats
            .iter()
            .map(|(atk, def)| format!("({atk}, {def})"))
            .collect();
        let names: Vec<&str> = self.named_cards.iter().map(String::as_str).collect();

        [
            self.master.name.clone(),
            format!("Attributes: [{attributes}]"),
            format!("Types: [{races}]"),
            format!("Archetypes: [{archetypes}]"),
            format!("ATK/DEF: {{{}}}", stats.join(", ")),
            format!("Named Cards: {{{}}}", names.join(", ")),
        ]
        .join("\n")
    }

    /// Banlist title, e.g. `[Domain] Gem-Knight Master Diamond`.
    #[must_use]
    pub fn iflist_title(&self) -> String {
        format!("{IFLIST_TITLE_PREFIX}{}", self.master.name)
    }

    /// The members as an EDOPro whitelist banlist, one copy each.
    #[must_use]
    pub fn to_iflist(&self) -> String {
        let title = self.iflist_title();
        let mut lines = vec![format!("#[{title}]"), format!("!{title}"), "$whitelist".to_string()];
        lines.extend(
            self.members
                .iter()
                .map(|card| format!("{} 1 -- {}", card.id, card.name)),
        );
        lines.join("\n")
    }

    /// File name for `to_iflist`, with every non-word character dropped.
    #[must_use]
    pub fn iflist_file_name(&self) -> String {
        word_chars(&self.iflist_title()) + IFLIST_EXTENSION
    }

    /// The members as a YGOPRODeck collection CSV, one copy each.
    ///
    /// Names are always quoted, with inner quotes doubled.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let mut lines = vec![CSV_HEADERS.join(",")];
        lines.extend(self.members.iter().map(|card| {
            format!(
                "\"{}\",1,None,None,None,None,DOMAIN,{}",
                card.name.replace('"', "\"\""),
                card.id
            )
        }));
        lines.join("\n")
    }

    /// File name for `to_csv`: `[Domain]` and the master's name without
    /// its non-word characters.
    #[must_use]
    pub fn csv_file_name(&self) -> String {
        format!("{CSV_PREFIX}{}{CSV_EXTENSION}", word_chars(&self.master.name))
    }
}

/// Keep only word characters (alphanumerics and `_`).
fn word_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Comma-separated names, falling back to hex for unknown codes.
fn named_list<'a, T, I, F>(codes: I, name: F) -> String
where
    T: std::fmt::LowerHex + 'a,
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> Option<&'a str>,
{
    codes
        .map(|code| match name(code) {
            Some(name) => name.to_string(),
            None => format!("{code:#x}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
