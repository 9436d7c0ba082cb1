//! Attribute and race name tables.
//!
//! Both come from the same constants file, as `#define ATTRIBUTE_<NAME> <code>`
//! and `#define RACE_<NAME> <code>` lines under `//Attributes` and `//Races`.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use super::section::{parse_code, parse_section};

pub const ATTRIBUTES_HEADER: &str = "//Attributes";
pub const RACES_HEADER: &str = "//Races";

static ATTRIBUTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#define ATTRIBUTE_(\w+)\s+(\S+)").expect("valid attribute pattern")
});
static RACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#define RACE_(\w+)\s+(\S+)").expect("valid race pattern"));

/// Bidirectional lowercase-name/code table.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    name_to_code: FxHashMap<String, u32>,
    code_to_name: FxHashMap<u32, String>,
}

impl Vocabulary {
    /// Attribute table from the constants file.
    pub fn attributes_from_text(text: &str) -> Self {
        Self::from_section(text, ATTRIBUTES_HEADER, &ATTRIBUTE_LINE)
    }

    /// Race table from the constants file.
    pub fn races_from_text(text: &str) -> Self {
        Self::from_section(text, RACES_HEADER, &RACE_LINE)
    }

    fn from_section(text: &str, header: &str, line: &Regex) -> Self {
        match parse_section(text, header, line) {
            Some(entries) => Self::from_entries(entries.into_iter().filter_map(|(name, code)| {
                match parse_code(&code).and_then(|c| u32::try_from(c).ok()) {
                    Some(code) => Some((name, code)),
                    None => {
                        warn!("Skipping [{}] with bad code [{}]", name, code);
                        None
                    }
                }
            })),
            None => {
                warn!("Could not find section [{}].", header);
                Self::default()
            }
        }
    }

    /// Build from `(name, code)` pairs. Later pairs win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        let mut vocab = Self::default();
        for (name, code) in entries {
            let name = name.as_ref().to_lowercase();
            vocab.code_to_name.insert(code, name.clone());
            vocab.name_to_code.insert(name, code);
        }
        vocab
    }

    #[must_use]
    pub fn code(&self, name: &str) -> Option<u32> {
        self.name_to_code.get(&name.to_lowercase()).copied()
    }

    #[must_use]
    pub fn name(&self, code: u32) -> Option<&str> {
        self.code_to_name.get(&code).map(String::as_str)
    }

    /// All names, longest first, then alphabetical.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.name_to_code.keys().map(String::as_str).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.name_to_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_to_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONSTANTS: &str = "\
--constants
//Attributes
#define ATTRIBUTE_EARTH\t\t0x01
#define ATTRIBUTE_DIVINE\t0x40

//Races
#define RACE_WARRIOR\t\t0x1
#define RACE_BEASTWARRIOR\t0x8000
#define RACE_DIVINE\t\t0x200000
";

    #[test]
    fn test_attributes() {
        let attrs = Vocabulary::attributes_from_text(CONSTANTS);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.code("earth"), Some(0x1));
        assert_eq!(attrs.code("DIVINE"), Some(0x40));
        assert_eq!(attrs.name(0x40), Some("divine"));
    }

    #[test]
    fn test_races() {
        let races = Vocabulary::races_from_text(CONSTANTS);
        assert_eq!(races.code("beastwarrior"), Some(0x8000));
        assert_eq!(races.code("divine"), Some(0x200000));
        assert_eq!(races.names(), vec!["beastwarrior", "warrior", "divine"]);
    }

    #[test]
    fn test_missing_section_is_empty() {
        let races = Vocabulary::races_from_text("//Attributes\n#define ATTRIBUTE_EARTH 0x01\n");
        assert!(races.is_empty());
        assert_eq!(races.code("warrior"), None);
    }
}
