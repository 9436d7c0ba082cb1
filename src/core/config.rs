//! Engine configuration.
//!
//! Everything the engine needs to know at startup is collected in
//! `EngineConfig`, built once and passed down by reference:
//! - where the reference texts, card database and reverse index live
//! - `ArchetypeOverrides`: hand-maintained corrections to the archetype table
//! - `ParserConfig`: vocabularies used by the description parser
//!
//! Every field has a default, so a JSON config file only needs the keys
//! it wants to change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Upper bound on index rebuild workers.
pub const MAX_REBUILD_WORKERS: usize = 8;

/// A composite archetype code and the base codes it resolves to.
///
/// Plain masking of the sub-archetype bits gets these wrong: either two
/// unrelated families share a bit pattern, or the card really belongs to
/// two families at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseException {
    pub code: u16,
    pub bases: Vec<u16>,
}

impl BaseException {
    pub fn new(code: u16, bases: impl Into<Vec<u16>>) -> Self {
        Self {
            code,
            bases: bases.into(),
        }
    }
}

/// Move whatever name was parsed under `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReplacement {
    pub from: u16,
    pub to: u16,
}

/// An archetype name added by hand, taking precedence over parsed data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraName {
    pub name: String,
    pub code: u16,
}

impl ExtraName {
    pub fn new(name: impl Into<String>, code: u16) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

/// Corrections applied on top of the parsed archetype reference.
///
/// This table tracks the current state of the upstream reference files.
/// There is no rule that predicts when a new entry is needed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeOverrides {
    /// Series listed upstream as archetypes that aren't (lowercase names).
    pub ignore: Vec<String>,
    /// Names listed under the wrong code upstream.
    pub replacements: Vec<CodeReplacement>,
    /// Names that share a code with another archetype.
    pub extra_names: Vec<ExtraName>,
    /// Explicit base resolution for composite codes.
    pub base_exceptions: Vec<BaseException>,
}

impl Default for ArchetypeOverrides {
    fn default() -> Self {
        let ignore = [
            "genex ally",
            "xx-saber",
            "evol",
            "dark lucius",
            "ultimate insect",
            "iron",
            "tin",
            "lightray",
            "djinn of rituals",
            "noble",
            "envy",
            "spiritual beast tamer",
            "entity",
            "supreme king",
            "spiritual art",
            "of the forest",
            "byssted",
            "kshatri-la",
            "purery",
            "earthbound servant",
            "infernoble",
            "helios",
        ];

        Self {
            ignore: ignore.iter().map(|s| (*s).to_string()).collect(),
            replacements: vec![
                // Magician
                CodeReplacement { from: 0xa2, to: 0x98 },
                // Number
                CodeReplacement { from: 0x16c, to: 0x48 },
            ],
            extra_names: vec![
                ExtraName::new("true draco", 0xf9),
                ExtraName::new("true king", 0xf9),
                ExtraName::new("magician", 0x98),
            ],
            base_exceptions: vec![
                // Dark Magician and Magician Girl are their own bases.
                BaseException::new(0x10a2, [0x10a2]),
                BaseException::new(0x20a2, [0x20a2]),
                // Dark Magician Girl is both.
                BaseException::new(0x30a2, [0x10a2, 0x20a2]),
                // Number C / Number C39: Number and Chaos.
                BaseException::new(0x1048, [0x48, 0xcf]),
                BaseException::new(0x5048, [0x48, 0xcf]),
                // CXyz: Chaos and Xyz.
                BaseException::new(0x1073, [0xcf, 0x73]),
                // Galaxy-Eyes Tachyon Dragon: Galaxy and Tachyon.
                BaseException::new(0x307b, [0x7b, 0x1ab]),
            ],
        }
    }
}

/// Vocabularies for the description parser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Card names that contain literal quote characters.
    ///
    /// These are cut out of the text before generic quote extraction,
    /// which would otherwise split them at the inner quotes.
    pub quoted_card_names: Vec<String>,

    /// Race names as printed in card text.
    ///
    /// Longer names must come before their prefixes ("beast-warrior"
    /// before "beast").
    pub races: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let quoted = [
            "\"A\" Cell Breeding Device",
            "\"A\" Cell Incubator",
            "\"A\" Cell Recombination Device",
            "\"A\" Cell Scatter Burst",
            "\"Infernoble Arms - Almace\"",
            "\"Infernoble Arms - Durendal\"",
            "\"Infernoble Arms - Hauteclere\"",
            "\"Infernoble Arms - Joyeuse\"",
        ];
        let races = [
            "aqua",
            "beast-warrior",
            "beast",
            "cyberse",
            "dinosaur",
            "divine-beast",
            "dragon",
            "fairy",
            "fiend",
            "fish",
            "illusion",
            "insect",
            "machine",
            "plant",
            "psychic",
            "pyro",
            "reptile",
            "rock",
            "sea serpent",
            "spellcaster",
            "thunder",
            "warrior",
            "winged beast",
            "wyrm",
            "zombie",
        ];

        Self {
            quoted_card_names: quoted.iter().map(|s| (*s).to_string()).collect(),
            races: races.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Folder holding the reference texts.
    pub reference_dir: PathBuf,

    /// Released archetype list (`#Official Archetypes` section).
    pub archetypes_file: String,

    /// Pre-release archetype list (two sections).
    pub pre_archetypes_file: String,

    /// Attribute and race constants (`//Attributes`, `//Races`).
    pub attr_races_file: String,

    /// Merged card database.
    pub cards_db: PathBuf,

    /// Reverse domain index.
    pub lookup_db: PathBuf,

    /// Index rebuild workers, clamped to `1..=MAX_REBUILD_WORKERS`.
    pub rebuild_workers: usize,

    pub archetypes: ArchetypeOverrides,

    pub parser: ParserConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("references/cardinfo"),
            archetypes_file: "archetypes.txt".to_string(),
            pre_archetypes_file: "pre-archetypes.txt".to_string(),
            attr_races_file: "attrRaces.txt".to_string(),
            cards_db: PathBuf::from("references/CDBs/merged_cards.cdb"),
            lookup_db: PathBuf::from("lookup/lookup.sqlite3"),
            rebuild_workers: MAX_REBUILD_WORKERS,
            archetypes: ArchetypeOverrides::default(),
            parser: ParserConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a config from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Point all paths at a different root, keeping file names.
    #[must_use]
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.reference_dir = root.join(&self.reference_dir);
        self.cards_db = root.join(&self.cards_db);
        self.lookup_db = root.join(&self.lookup_db);
        self
    }

    /// Set the rebuild worker count.
    #[must_use]
    pub fn with_rebuild_workers(mut self, workers: usize) -> Self {
        self.rebuild_workers = workers;
        self
    }

    #[must_use]
    pub fn archetypes_path(&self) -> PathBuf {
        self.reference_dir.join(&self.archetypes_file)
    }

    #[must_use]
    pub fn pre_archetypes_path(&self) -> PathBuf {
        self.reference_dir.join(&self.pre_archetypes_file)
    }

    #[must_use]
    pub fn attr_races_path(&self) -> PathBuf {
        self.reference_dir.join(&self.attr_races_file)
    }

    /// Worker count actually used by a rebuild.
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.rebuild_workers.clamp(1, MAX_REBUILD_WORKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_overrides() {
        let overrides = ArchetypeOverrides::default();
        assert!(overrides.ignore.contains(&"genex ally".to_string()));
        assert_eq!(overrides.base_exceptions.len(), 7);
        assert!(overrides
            .base_exceptions
            .iter()
            .any(|e| e.code == 0x30a2 && e.bases == vec![0x10a2, 0x20a2]));
    }

    #[test]
    fn test_race_vocabulary_prefix_order() {
        let races = ParserConfig::default().races;
        let pos = |name: &str| races.iter().position(|r| r == name).unwrap();
        assert!(pos("beast-warrior") < pos("beast"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "rebuild_workers": 3 }"#).unwrap();
        assert_eq!(config.rebuild_workers, 3);
        assert_eq!(config.archetypes, ArchetypeOverrides::default());
        assert_eq!(config.lookup_db, PathBuf::from("lookup/lookup.sqlite3"));
    }

    #[test]
    fn test_json_overrides_exceptions() {
        let json = r#"{
            "archetypes": {
                "base_exceptions": [ { "code": 4711, "bases": [1, 2] } ]
            }
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.archetypes.base_exceptions, vec![BaseException::new(4711, [1, 2])]);
        // Unlisted override fields fall back to their defaults.
        assert!(!config.archetypes.ignore.is_empty());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::core::Error::Config(_)));
    }

    #[test]
    fn test_effective_workers_clamped() {
        assert_eq!(EngineConfig::default().with_rebuild_workers(0).effective_workers(), 1);
        assert_eq!(EngineConfig::default().with_rebuild_workers(32).effective_workers(), 8);
        assert_eq!(EngineConfig::default().with_rebuild_workers(4).effective_workers(), 4);
    }

    #[test]
    fn test_paths() {
        let config = EngineConfig::default().with_root("/data");
        assert_eq!(
            config.archetypes_path(),
            PathBuf::from("/data/references/cardinfo/archetypes.txt")
        );
        assert_eq!(config.lookup_db, PathBuf::from("/data/lookup/lookup.sqlite3"));
    }
}
