//! Archetype names, codes and the base-archetype hierarchy.
//!
//! An archetype code's top four bits mark a sub-archetype: "Gem-Knight"
//! (0x1047) sits under "Gem-" (0x047). Cards of a sub-archetype belong
//! to the base archetype as well, never the other way around.
//! `ArchetypeHierarchy::resolve_base` maps any code a card carries to
//! the base code(s) a domain stores.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{ArchetypeOverrides, BASE_ARCHETYPE_MASK};

use super::section::{parse_code, parse_section};

/// Section header of the released archetype list.
pub const RELEASED_HEADER: &str = "#Official Archetypes";
/// The pre-release file spells its released section with a lowercase "a".
pub const PRE_RELEASED_HEADER: &str = "#Official archetypes";
/// Section header of the pre-release archetype list.
pub const PRE_RELEASE_HEADER: &str = "#Pre-release archetypes";

static SETNAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!setname (\S+) (.*)$").expect("valid setname pattern"));

/// Base codes a single archetype code resolves to.
pub type BaseCodes = SmallVec<[u16; 2]>;

/// Archetype name table plus base-code resolution.
#[derive(Clone, Debug, Default)]
pub struct ArchetypeHierarchy {
    code_to_name: FxHashMap<u16, String>,
    name_to_code: FxHashMap<String, u16>,
    exceptions: FxHashMap<u16, BaseCodes>,
}

impl ArchetypeHierarchy {
    /// Build from the released and pre-release reference texts.
    ///
    /// A missing section is logged and contributes nothing.
    pub fn from_texts(released: &str, pre_release: &str, overrides: &ArchetypeOverrides) -> Self {
        let mut entries = Vec::new();
        for (text, header) in [
            (released, RELEASED_HEADER),
            (pre_release, PRE_RELEASED_HEADER),
            (pre_release, PRE_RELEASE_HEADER),
        ] {
            match parse_section(text, header, &SETNAME_LINE) {
                Some(section) => entries.extend(section.into_iter().filter_map(|(code, name)| {
                    match parse_code(&code).and_then(|c| u16::try_from(c).ok()) {
                        Some(code) => Some((code, name)),
                        None => {
                            warn!("Skipping archetype [{}] with bad code [{}]", name, code);
                            None
                        }
                    }
                })),
                None => warn!("Could not find section [{}].", header),
            }
        }
        Self::from_entries(entries, overrides)
    }

    /// Build from `(code, name)` pairs in reference order.
    ///
    /// Later pairs overwrite earlier ones. Overrides are applied in a
    /// fixed order: code replacements, ignore-list, then extra names.
    pub fn from_entries<I, S>(entries: I, overrides: &ArchetypeOverrides) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: AsRef<str>,
    {
        let mut code_to_name: FxHashMap<u16, String> = FxHashMap::default();
        let mut name_to_code: FxHashMap<String, u16> = FxHashMap::default();

        for (code, name) in entries {
            let name = name.as_ref().to_lowercase();
            code_to_name.insert(code, name.clone());
            name_to_code.insert(name, code);
        }

        for replacement in &overrides.replacements {
            if let Some(name) = code_to_name.remove(&replacement.from) {
                name_to_code.insert(name.clone(), replacement.to);
                code_to_name.insert(replacement.to, name);
            }
        }

        for ignored in &overrides.ignore {
            if let Some(code) = name_to_code.remove(ignored) {
                // Codes can be shared between names; only drop the code if
                // it still belongs to the ignored name.
                if code_to_name.get(&code) == Some(ignored) {
                    code_to_name.remove(&code);
                }
            }
        }

        for extra in &overrides.extra_names {
            name_to_code.insert(extra.name.to_lowercase(), extra.code);
        }

        let exceptions = overrides
            .base_exceptions
            .iter()
            .map(|e| (e.code, e.bases.iter().copied().collect()))
            .collect();

        Self {
            code_to_name,
            name_to_code,
            exceptions,
        }
    }

    /// Base archetype code(s) for a raw archetype code.
    ///
    /// Empty when the code is ignored or unknown.
    #[must_use]
    pub fn resolve_base(&self, code: u16) -> BaseCodes {
        if let Some(bases) = self.exceptions.get(&code) {
            return bases.clone();
        }

        let base = code & BASE_ARCHETYPE_MASK;
        if self.code_to_name.contains_key(&base) {
            return smallvec::smallvec![base];
        }

        // Archetypes like "Supreme King Gate" only exist with the
        // qualifier bits set.
        if self.code_to_name.contains_key(&code) {
            return smallvec::smallvec![code];
        }

        BaseCodes::new()
    }

    /// Resolve every code and return the union, in first-seen order.
    pub fn resolve_all(&self, codes: impl IntoIterator<Item = u16>) -> Vec<u16> {
        let mut out = Vec::new();
        for code in codes {
            for base in self.resolve_base(code) {
                if !out.contains(&base) {
                    out.push(base);
                }
            }
        }
        out
    }

    /// Code for a (case-insensitive) archetype name.
    #[must_use]
    pub fn code_of(&self, name: &str) -> Option<u16> {
        self.name_to_code.get(&name.to_lowercase()).copied()
    }

    /// Lowercase name for a code.
    #[must_use]
    pub fn name_of(&self, code: u16) -> Option<&str> {
        self.code_to_name.get(&code).map(String::as_str)
    }

    /// True when the code names a known archetype.
    #[must_use]
    pub fn is_known(&self, code: u16) -> bool {
        self.code_to_name.contains_key(&code)
    }

    /// Number of known archetype codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code_to_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code_to_name.is_empty()
    }
}
