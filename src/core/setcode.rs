//! Packed archetype setcodes.
//!
//! Card databases store up to four 16-bit archetype codes in a single
//! 64-bit column, one per window at bit offsets 0, 16, 32 and 48.
//! `SetCode` keeps the four windows as an array so the packing rule
//! lives in exactly one place.
//!
//! An archetype code itself has two parts: the low 12 bits name the base
//! archetype ("Gem-") and the top 4 bits qualify a sub-archetype
//! ("Gem-Knight").

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Bits of an archetype code that identify the base archetype.
pub const BASE_ARCHETYPE_MASK: u16 = 0x0FFF;

const WINDOW_BITS: u32 = 16;
const WINDOWS: usize = 4;

/// Archetype codes of a card, decoded from the packed database column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetCode([u16; WINDOWS]);

impl SetCode {
    /// Build from explicit windows (window 0 is the lowest 16 bits).
    #[must_use]
    pub const fn new(windows: [u16; WINDOWS]) -> Self {
        Self(windows)
    }

    /// Decode the packed 64-bit database value.
    #[must_use]
    pub fn from_packed(packed: u64) -> Self {
        let mut windows = [0u16; WINDOWS];
        for (i, window) in windows.iter_mut().enumerate() {
            *window = (packed >> (i as u32 * WINDOW_BITS)) as u16;
        }
        Self(windows)
    }

    /// Fill windows from a list of codes, in order. Codes past the fourth are dropped.
    #[must_use]
    pub fn from_codes(codes: &[u16]) -> Self {
        let mut windows = [0u16; WINDOWS];
        for (window, code) in windows.iter_mut().zip(codes) {
            *window = *code;
        }
        Self(windows)
    }

    /// Pack back into the database representation.
    #[must_use]
    pub fn to_packed(self) -> u64 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, code)| **code != 0)
            .fold(0u64, |acc, (i, code)| {
                acc | (u64::from(*code) << (i as u32 * WINDOW_BITS))
            })
    }

    /// The raw windows, zeros included.
    #[must_use]
    pub const fn windows(self) -> [u16; WINDOWS] {
        self.0
    }

    /// Nonzero archetype codes in window order. Duplicates are kept.
    #[must_use]
    pub fn codes(self) -> SmallVec<[u16; WINDOWS]> {
        self.0.iter().copied().filter(|c| *c != 0).collect()
    }

    /// True when the card belongs to no archetype at all.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0.iter().all(|c| *c == 0)
    }
}

impl From<u64> for SetCode {
    fn from(packed: u64) -> Self {
        Self::from_packed(packed)
    }
}

impl std::fmt::Display for SetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.to_packed())
    }
}
