//! Card records.
//!
//! `Card` is an immutable snapshot of one row of the card database: the
//! passcode, printed name and text, battle stats, race, attribute, type
//! flags and packed archetype codes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::SetCode;

/// Card passcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for the "no card" id (used by `Card::alias`).
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Card type bitmask as stored in the database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeFlags(pub u32);

impl TypeFlags {
    pub const MONSTER: u32 = 0x1;
    pub const SPELL: u32 = 0x2;
    pub const TRAP: u32 = 0x4;
    pub const NORMAL: u32 = 0x10;
    pub const EFFECT: u32 = 0x20;
    pub const FUSION: u32 = 0x40;
    pub const RITUAL: u32 = 0x80;
    pub const SYNCHRO: u32 = 0x2000;
    pub const TOKEN: u32 = 0x4000;
    pub const XYZ: u32 = 0x80_0000;
    pub const PENDULUM: u32 = 0x100_0000;
    pub const LINK: u32 = 0x400_0000;

    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    /// A monster that is not a token.
    #[must_use]
    pub const fn is_monster(self) -> bool {
        self.contains(Self::MONSTER) && !self.contains(Self::TOKEN)
    }

    /// Neither a monster nor a token.
    #[must_use]
    pub const fn is_spell_or_trap(self) -> bool {
        !self.contains(Self::MONSTER) && !self.contains(Self::TOKEN)
    }

    /// A vanilla monster: its text is flavor, not rules.
    #[must_use]
    pub const fn is_normal(self) -> bool {
        self.contains(Self::NORMAL)
    }
}

/// One card, as read from the catalog.
///
/// ## Example
///
/// ```
/// use dm_domains::cards::{Card, CardId, TypeFlags};
///
/// let lazuli = Card::new(CardId::new(2), "Gem-Knight Lazuli")
///     .with_type(TypeFlags::MONSTER | TypeFlags::EFFECT)
///     .with_stats(600, 100)
///     .with_archetypes(&[0x1047]);
///
/// assert!(lazuli.is_monster());
/// assert_eq!(lazuli.archetype_codes().as_slice(), &[0x1047]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,

    /// The card this one is an alternate artwork of, or `CardId(0)`.
    pub alias: CardId,

    pub name: String,

    pub description: String,

    pub attack: i32,

    pub defense: i32,

    /// Race (monster type) bit.
    pub race: u32,

    /// Attribute bit.
    pub attribute: u32,

    pub type_flags: TypeFlags,

    pub setcode: SetCode,
}

impl Card {
    /// Create a card with only an id and a name.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            alias: CardId::default(),
            name: name.into(),
            description: String::new(),
            attack: 0,
            defense: 0,
            race: 0,
            attribute: 0,
            type_flags: TypeFlags::default(),
            setcode: SetCode::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_stats(mut self, attack: i32, defense: i32) -> Self {
        self.attack = attack;
        self.defense = defense;
        self
    }

    #[must_use]
    pub fn with_race(mut self, race: u32) -> Self {
        self.race = race;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: u32) -> Self {
        self.attribute = attribute;
        self
    }

    #[must_use]
    pub fn with_type(mut self, bits: u32) -> Self {
        self.type_flags = TypeFlags::new(bits);
        self
    }

    #[must_use]
    pub fn with_archetypes(mut self, codes: &[u16]) -> Self {
        self.setcode = SetCode::from_codes(codes);
        self
    }

    #[must_use]
    pub fn with_alias(mut self, alias: CardId) -> Self {
        self.alias = alias;
        self
    }

    /// Nonzero archetype codes in window order.
    #[must_use]
    pub fn archetype_codes(&self) -> SmallVec<[u16; 4]> {
        self.setcode.codes()
    }

    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.type_flags.is_monster()
    }

    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.type_flags.is_normal()
    }

    /// The id duplicates are counted under: the alias when there is one.
    #[must_use]
    pub fn original_id(&self) -> CardId {
        if self.alias.is_none() {
            self.id
        } else {
            self.alias
        }
    }
}
