//! Defect collection grouped by the user responsible for an item.

use std::fmt::Write as _;

use crate::models::ItemRecord;

/// Heading used for defects on items without a known creator.
pub const UNKNOWN_OWNER: &str = "unknown user";

/// One defect found on one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemEntry {
    /// Resolved creator name, `None` when the server reported none.
    pub owner: Option<String>,
    pub item_key: String,
    /// Parent key for child records, otherwise the item key.
    pub link_key: String,
    pub message: String,
}

/// Accumulates defects in first-seen owner order.
#[derive(Debug, Clone)]
pub struct ProblemLog {
    library_url: String,
    groups: Vec<(Option<String>, Vec<ProblemEntry>)>,
}

impl ProblemLog {
    /// Create an empty log whose links point into `library_url`
    /// (e.g. `https://www.zotero.org/groups/2480461`).
    pub fn new(library_url: impl Into<String>) -> Self {
        Self {
            library_url: library_url.into().trim_end_matches('/').to_string(),
            groups: Vec::new(),
        }
    }

    /// Record a defect against `item`.
    pub fn record(&mut self, item: &ItemRecord, message: impl Into<String>) {
        let entry = ProblemEntry {
            owner: item.owner().map(ToOwned::to_owned),
            item_key: item.key().to_string(),
            link_key: item.link_key().to_string(),
            message: message.into(),
        };

        match self
            .groups
            .iter_mut()
            .find(|(owner, _)| *owner == entry.owner)
        {
            Some((_, entries)) => entries.push(entry),
            None => self.groups.push((entry.owner.clone(), vec![entry])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of recorded defects.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, entries)| entries.len()).sum()
    }

    /// All entries, grouped by owner in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = &ProblemEntry> {
        self.groups.iter().flat_map(|(_, entries)| entries.iter())
    }

    /// Deep link to the web page of the record an entry refers to.
    pub fn item_url(&self, entry: &ProblemEntry) -> String {
        format!("{}/items/{}/item-details", self.library_url, entry.link_key)
    }

    /// Render the grouped, formatted report.
    pub fn render(&self) -> Report {
        let sections = self
            .groups
            .iter()
            .map(|(owner, entries)| {
                let owner_label = owner.as_deref().unwrap_or(UNKNOWN_OWNER);
                ReportSection {
                    owner: owner.clone(),
                    lines: entries
                        .iter()
                        .map(|entry| {
                            format!(
                                "[{}]({}) {} ({owner_label})",
                                entry.item_key,
                                self.item_url(entry),
                                entry.message
                            )
                        })
                        .collect(),
                }
            })
            .collect();

        Report { sections }
    }
}

/// Defect lines of one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub owner: Option<String>,
    pub lines: Vec<String>,
}

/// Rendered defects grouped by owner. Empty means a clean run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Markdown with one `###` heading per owner.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        for section in &self.sections {
            let owner = section.owner.as_deref().unwrap_or(UNKNOWN_OWNER);
            let _ = writeln!(output, "### {owner}");
            let _ = writeln!(output);
            for line in &section.lines {
                let _ = writeln!(output, "{line}");
                let _ = writeln!(output);
            }
            let _ = writeln!(output);
        }

        output
    }
}
