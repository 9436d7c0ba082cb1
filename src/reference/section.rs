//! Header-delimited sections of the reference texts.
//!
//! A section is a header line followed by consecutive entry lines that
//! all match one pattern. The first line that doesn't match ends the
//! section.

use regex::Regex;

/// Collect the two capture groups of every entry line under `header`.
///
/// Returns `None` when the header isn't in the text at all.
pub fn parse_section(text: &str, header: &str, entry: &Regex) -> Option<Vec<(String, String)>> {
    let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));
    lines.by_ref().find(|line| *line == header)?;

    let entries = lines
        .map_while(|line| entry.captures(line))
        .filter_map(|caps| {
            let first = caps.get(1)?.as_str().trim().to_string();
            let second = caps.get(2)?.as_str().trim().to_string();
            Some((first, second))
        })
        .collect();
    Some(entries)
}

/// Parse a numeric code written as `0x`-prefixed hex or as decimal.
#[must_use]
pub fn parse_code(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setname() -> Regex {
        Regex::new(r"^!setname (\S+) (.*)$").unwrap()
    }

    #[test]
    fn test_parse_section_stops_at_first_other_line() {
        let text = "#Official Archetypes\n!setname 0x47 Gem-\n!setname 0x1047 Gem-Knight\n\n!setname 0x99 After\n";
        let entries = parse_section(text, "#Official Archetypes", &setname()).unwrap();
        assert_eq!(
            entries,
            vec![
                ("0x47".to_string(), "Gem-".to_string()),
                ("0x1047".to_string(), "Gem-Knight".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_section_handles_crlf() {
        let text = "junk\r\n#Official Archetypes\r\n!setname 0x47 Gem-\r\n";
        let entries = parse_section(text, "#Official Archetypes", &setname()).unwrap();
        assert_eq!(entries, vec![("0x47".to_string(), "Gem-".to_string())]);
    }

    #[test]
    fn test_missing_header() {
        assert!(parse_section("!setname 0x1 A\n", "#Official Archetypes", &setname()).is_none());
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let text = "#Official archetypes\n!setname 0x1 A\n";
        assert!(parse_section(text, "#Official Archetypes", &setname()).is_none());
        assert!(parse_section(text, "#Official archetypes", &setname()).is_some());
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("0x1047"), Some(0x1047));
        assert_eq!(parse_code("0X1f"), Some(0x1f));
        assert_eq!(parse_code("64"), Some(64));
        assert_eq!(parse_code("0xzz"), None);
        assert_eq!(parse_code("bogus"), None);
    }
}
