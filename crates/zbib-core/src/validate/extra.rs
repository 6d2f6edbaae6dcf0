//! Parser for the `extra` field of an item.
//!
//! Grammar: one `key: value` pair per line. Blank lines are ignored, the line
//! is split on the first `:`, and key and value are trimmed. A non-blank line
//! without `:` is a defect that is reported and skipped.

use std::collections::BTreeMap;
use std::fmt;

/// Key used by Better BibTeX to pin the citation key of an item.
pub const CITATION_KEY: &str = "Citation Key";

/// A non-blank line without a `key: value` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFieldDefect {
    pub line: String,
}

impl fmt::Display for ExtraFieldDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "information in extra field not formatted as key:value pair: {}",
            self.line
        )
    }
}

/// Key/value pairs parsed from one item's `extra` field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraFieldMap(BTreeMap<String, String>);

impl ExtraFieldMap {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn citation_key(&self) -> Option<&str> {
        self.get(CITATION_KEY)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Parse an `extra` blob, reporting malformed lines through `on_defect`.
///
/// Never fails: every well-formed line ends up in the map, later duplicates
/// overwriting earlier ones.
pub fn parse_extra_field(
    raw: &str,
    mut on_defect: impl FnMut(ExtraFieldDefect),
) -> ExtraFieldMap {
    let mut map = BTreeMap::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                map.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => on_defect(ExtraFieldDefect {
                line: line.to_string(),
            }),
        }
    }

    ExtraFieldMap(map)
}
