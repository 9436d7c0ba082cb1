//! Card description parsing.
//!
//! The parser runs a fixed sequence of regex stages over a Deck Master's
//! text. Each stage collects its captures and cuts the matched spans out
//! before the next stage runs:
//!
//! 1. "(This card is not treated as a "X" card.)" clauses (dropped)
//! 2. quoted card names that themselves contain quotes
//! 3. any other quoted span (archetype or card name)
//! 4. parenthesised reminder text (dropped)
//! 5. ATK/DEF mentions
//! 6. races, from the printed-name vocabulary
//! 7. attributes, from the reference vocabulary
//!
//! The order matters: quotes and parentheses left in the text would split
//! or pollute the later matches.

use std::collections::BTreeSet;

use log::warn;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::cards::Card;
use crate::core::ParserConfig;
use crate::reference::{Vocabulary, DIVINE};

static NOT_TREATED_AS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\(This card is not treated as an? ".*?" card\.\)"#)
        .expect("valid not-treated-as pattern")
});

static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(.*?)""#).expect("valid mention pattern"));

static PARENTHESES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\(.*?\))").expect("valid parentheses pattern"));

static BATTLE_STATS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(",
        r"[0-9]{1,4} ATK/[0-9]{1,4} DEF",
        r"|ATK [0-9]{1,4}/DEF [0-9]{1,4}",
        r"|[0-9]{1,4} ATK and [0-9]{1,4} DEF",
        r"|[0-9]{1,4} ATK and/or DEF",
        r"|[0-9]{1,4} ATK/DEF",
        r")"
    ))
    .expect("valid battle stat pattern")
});

static STAT_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\D*([0-9]{1,4})\D+([0-9]{1,4})\D*$").expect("valid stat pair pattern")
});

static STAT_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{1,4})").expect("valid single stat pattern"));

/// Printed race name whose table key differs.
const DIVINE_BEAST: &str = "divinebeast";

/// What the parser found in one description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Quoted spans: archetype names or card names, lowercase.
    pub mentions: BTreeSet<String>,
    /// Card names containing literal quotes, lowercase.
    pub quoted_card_names: BTreeSet<String>,
    /// `(atk, def)` pairs.
    pub battle_stats: BTreeSet<(i32, i32)>,
    /// Race table keys (`beastwarrior`, `divine`, ...).
    pub races: BTreeSet<String>,
    /// Attribute table keys.
    pub attributes: BTreeSet<String>,
}

/// Compiled description parser.
#[derive(Clone, Debug)]
pub struct DescriptionParser {
    quoted_names: Option<Regex>,
    races: Option<Regex>,
    attributes: Option<Regex>,
}

impl DescriptionParser {
    /// Compile the vocabulary-driven stages.
    ///
    /// An empty vocabulary disables its stage rather than producing a
    /// pattern that matches everywhere.
    pub fn new(config: &ParserConfig, attributes: &Vocabulary) -> Self {
        let quoted_names = alternation(
            config.quoted_card_names.iter().map(String::as_str),
            |alts| format!(r#"(?i)"({alts})""#),
        );
        let races = alternation(config.races.iter().map(String::as_str), |alts| {
            format!("(?i)({alts})")
        });
        let attributes = alternation(attributes.names(), |alts| format!("(?i)({alts})"));

        Self {
            quoted_names,
            races,
            attributes,
        }
    }

    /// Parse a card's description.
    #[must_use]
    pub fn extract(&self, card: &Card) -> Extraction {
        self.extract_text(&card.description)
    }

    /// Parse free text.
    #[must_use]
    pub fn extract_text(&self, text: &str) -> Extraction {
        let mut out = Extraction::default();
        let mut scratch = BTreeSet::new();

        let text = strip(text, &NOT_TREATED_AS, &mut scratch);
        let text = match &self.quoted_names {
            Some(re) => strip(&text, re, &mut out.quoted_card_names),
            None => text,
        };
        let text = strip(&text, &MENTION, &mut out.mentions);
        let text = strip(&text, &PARENTHESES, &mut scratch);

        let mut stats = BTreeSet::new();
        let text = strip(&text, &BATTLE_STATS, &mut stats);
        out.battle_stats = stats.iter().filter_map(|raw| parse_battle_stat(raw)).collect();

        let text = match &self.races {
            Some(re) => {
                let mut races = BTreeSet::new();
                let text = strip(&text, re, &mut races);
                out.races = races.iter().map(|r| normalize_race(r)).collect();
                text
            }
            None => text,
        };

        if let Some(re) = &self.attributes {
            strip(&text, re, &mut out.attributes);
        }

        out
    }
}

/// Build `wrap(a|b|c)` from escaped alternatives; `None` when there are none.
fn alternation<'a, I, F>(alternatives: I, wrap: F) -> Option<Regex>
where
    I: IntoIterator<Item = &'a str>,
    F: FnOnce(&str) -> String,
{
    let escaped: Vec<String> = alternatives
        .into_iter()
        .filter(|a| !a.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return None;
    }

    let pattern = wrap(&escaped.join("|"));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            warn!("Disabling parser stage, bad pattern: {}", err);
            None
        }
    }
}

/// Remove every match of `re` from `text`, collecting group 1 in lowercase.
fn strip(text: &str, re: &Regex, found: &mut BTreeSet<String>) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        if let Some(m) = caps.get(1).or_else(|| caps.get(0)) {
            found.insert(m.as_str().to_lowercase());
        }
        ""
    })
    .into_owned()
}

/// "1900 atk/1800 def" -> (1900, 1800); "1900 atk/def" -> (1900, 1900).
fn parse_battle_stat(raw: &str) -> Option<(i32, i32)> {
    if let Some(caps) = STAT_PAIR.captures(raw) {
        if let (Ok(atk), Ok(def)) = (caps[1].parse(), caps[2].parse()) {
            return Some((atk, def));
        }
    }
    if let Some(value) = STAT_SINGLE
        .captures(raw)
        .and_then(|caps| caps[1].parse::<i32>().ok())
    {
        return Some((value, value));
    }
    warn!("Could not read battle stats from [{}]", raw);
    None
}

/// "beast-warrior" -> "beastwarrior", "divine-beast" -> "divine".
fn normalize_race(raw: &str) -> String {
    let key: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
    if key == DIVINE_BEAST {
        DIVINE.to_string()
    } else {
        key
    }
}
