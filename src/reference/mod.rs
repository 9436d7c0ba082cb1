//! Reference tables: archetypes, attributes and races.
//!
//! The tables are parsed from three text files (released archetypes,
//! pre-release archetypes, attribute/race constants). A section that is
//! missing from its file is logged and leaves that table empty, so the
//! engine degrades to "no matches" instead of failing.
//!
//! `Reference` bundles the three tables. It is built once at startup
//! and passed by reference to everything that needs it.

pub mod archetypes;
pub mod section;
pub mod vocabulary;

use log::info;

use crate::core::{ArchetypeOverrides, EngineConfig, Result};

pub use archetypes::{ArchetypeHierarchy, BaseCodes};
pub use vocabulary::Vocabulary;

/// Name of the divine attribute and of the divine-beast race in the tables.
pub const DIVINE: &str = "divine";

/// All reference tables.
#[derive(Clone, Debug, Default)]
pub struct Reference {
    pub archetypes: ArchetypeHierarchy,
    pub attributes: Vocabulary,
    pub races: Vocabulary,
}

impl Reference {
    /// Read the reference files named by the config.
    ///
    /// A file that can't be read is an error; a section missing from a
    /// file that was read is not.
    pub fn load(config: &EngineConfig) -> Result<Self> {
        info!("Setting up reference tables from {}", config.reference_dir.display());
        let released = std::fs::read_to_string(config.archetypes_path())?;
        let pre_release = std::fs::read_to_string(config.pre_archetypes_path())?;
        let attr_races = std::fs::read_to_string(config.attr_races_path())?;

        let reference = Self::from_texts(&released, &pre_release, &attr_races, &config.archetypes);
        info!(
            "Loaded {} archetypes, {} attributes, {} races",
            reference.archetypes.len(),
            reference.attributes.len(),
            reference.races.len()
        );
        Ok(reference)
    }

    /// Build from already-loaded reference texts.
    #[must_use]
    pub fn from_texts(
        released: &str,
        pre_release: &str,
        attr_races: &str,
        overrides: &ArchetypeOverrides,
    ) -> Self {
        Self {
            archetypes: ArchetypeHierarchy::from_texts(released, pre_release, overrides),
            attributes: Vocabulary::attributes_from_text(attr_races),
            races: Vocabulary::races_from_text(attr_races),
        }
    }

    /// Code of the divine attribute, if the table has it.
    #[must_use]
    pub fn divine_attribute(&self) -> Option<u32> {
        self.attributes.code(DIVINE)
    }

    /// Code of the divine-beast race, if the table has it.
    #[must_use]
    pub fn divine_race(&self) -> Option<u32> {
        self.races.code(DIVINE)
    }
}
