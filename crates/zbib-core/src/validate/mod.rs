//! Consistency checks over a fetched item collection.
//!
//! Rules, applied to every item that is not an annotation:
//! - a record with a real biblatex entry must carry at least one tag;
//! - a `Citation Key` in the extra field must be at least 3 characters;
//! - an attachment file name must contain a language marker such as `--en--`,
//!   unless it is a snapshot or its parent record is not known.

mod extra;
mod problems;

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::models::{ItemRecord, ItemType};

pub use extra::{parse_extra_field, ExtraFieldDefect, ExtraFieldMap, CITATION_KEY};
pub use problems::{ProblemEntry, ProblemLog, Report, ReportSection, UNKNOWN_OWNER};

const LANGUAGE_MARKER_PATTERN: &str = "--[a-zA-Z]{2,}--";
const SNAPSHOT_MARKER: &str = "Snapshot";
const MIN_CITATION_KEY_LEN: usize = 3;

/// How parent references are resolved for the file naming rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentResolution {
    /// A parent counts only if it appeared earlier in the collection.
    #[default]
    InOrder,
    /// A parent counts if it appears anywhere in the collection.
    WholeCollection,
}

/// Applies the per-item rules and routes defects to a [`ProblemLog`].
#[derive(Debug, Clone)]
pub struct ConsistencyValidator {
    language_marker: Regex,
    parent_resolution: ParentResolution,
}

impl Default for ConsistencyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsistencyValidator {
    pub fn new() -> Self {
        Self {
            language_marker: Regex::new(LANGUAGE_MARKER_PATTERN).expect("Invalid regex"),
            parent_resolution: ParentResolution::default(),
        }
    }

    #[must_use]
    pub const fn with_parent_resolution(mut self, parent_resolution: ParentResolution) -> Self {
        self.parent_resolution = parent_resolution;
        self
    }

    /// Scan `items` left to right and record every defect in `log`.
    pub fn validate(&self, items: &[ItemRecord], log: &mut ProblemLog) {
        let mut known_keys: HashSet<&str> = match self.parent_resolution {
            ParentResolution::InOrder => HashSet::new(),
            ParentResolution::WholeCollection => items
                .iter()
                .filter(|item| !is_annotation(item))
                .map(ItemRecord::key)
                .collect(),
        };

        for item in items {
            if is_annotation(item) {
                continue;
            }
            known_keys.insert(item.key());

            check_tags(item, log);
            check_citation_key(item, log);
            self.check_file_name(item, &known_keys, log);
        }

        debug!(items = items.len(), defects = log.len(), "validation finished");
    }

    fn check_file_name(&self, item: &ItemRecord, known_keys: &HashSet<&str>, log: &mut ProblemLog) {
        let Some(filename) = item.data.filename.as_deref() else {
            return;
        };
        if self.language_marker.is_match(filename) {
            return;
        }

        let title = item.data.title.as_deref().unwrap_or_default();
        if format!("{filename}{title}").contains(SNAPSHOT_MARKER) {
            return;
        }

        let has_known_parent = item
            .parent_key()
            .is_some_and(|parent| parent != item.key() && known_keys.contains(parent));
        if has_known_parent {
            log.record(
                item,
                format!("does not comply with file naming convention: {filename}"),
            );
        }
    }
}

fn check_tags(item: &ItemRecord, log: &mut ProblemLog) {
    if item.data.tags.is_empty() && item.has_biblatex() {
        log.record(item, "has no tags");
    }
}

fn check_citation_key(item: &ItemRecord, log: &mut ProblemLog) {
    let Some(raw) = item.data.extra.as_deref() else {
        return;
    };

    let mut defects = Vec::new();
    let extra = parse_extra_field(raw, |defect| defects.push(defect));
    for defect in defects {
        log.record(item, defect.to_string());
    }

    if let Some(citation_key) = extra.citation_key() {
        if citation_key.chars().count() < MIN_CITATION_KEY_LEN {
            log.record(
                item,
                format!("{citation_key} is too short as a citation key."),
            );
        }
    }
}

fn is_annotation(item: &ItemRecord) -> bool {
    *item.item_type() == ItemType::Annotation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatedByUser, ItemTag};
    use pretty_assertions::assert_eq;

    const LIBRARY_URL: &str = "https://www.zotero.org/groups/2480461";

    fn article(key: &str) -> ItemRecord {
        let mut item = ItemRecord::new(key, ItemType::Bibliographic("journalArticle".to_string()));
        item.data.tags.push(ItemTag::new("ms_author"));
        item.meta.created_by_user = Some(CreatedByUser {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        });
        item
    }

    fn attachment(key: &str, parent: Option<&str>, filename: &str) -> ItemRecord {
        let mut item = ItemRecord::new(key, ItemType::Attachment);
        item.data.parent_item = parent.map(ToOwned::to_owned);
        item.data.filename = Some(filename.to_string());
        item
    }

    fn messages(validator: &ConsistencyValidator, items: &[ItemRecord]) -> Vec<(String, String)> {
        let mut log = ProblemLog::new(LIBRARY_URL);
        validator.validate(items, &mut log);
        log.entries()
            .map(|entry| (entry.item_key.clone(), entry.message.clone()))
            .collect()
    }

    fn check(items: &[ItemRecord]) -> Vec<(String, String)> {
        messages(&ConsistencyValidator::new(), items)
    }

    #[test]
    fn untagged_item_with_biblatex_is_flagged() {
        let mut item = article("A");
        item.data.tags.clear();
        item.biblatex = "xyz1".to_string();

        assert_eq!(
            check(&[item]),
            vec![("A".to_string(), "has no tags".to_string())]
        );
    }

    #[test]
    fn untagged_item_with_placeholder_biblatex_is_not_flagged() {
        let mut item = article("A");
        item.data.tags.clear();
        item.biblatex = "{}".to_string();

        assert!(check(&[item]).is_empty());
    }

    #[test]
    fn short_citation_key_is_flagged() {
        let mut short = article("A");
        short.data.extra = Some("Citation Key: ab".to_string());
        let mut long_enough = article("B");
        long_enough.data.extra = Some("Citation Key: abc".to_string());

        assert_eq!(
            check(&[short, long_enough]),
            vec![(
                "A".to_string(),
                "ab is too short as a citation key.".to_string()
            )]
        );
    }

    #[test]
    fn malformed_extra_lines_are_reported_and_scan_continues() {
        let mut item = article("A");
        item.data.extra = Some("Citation Key: a\nfoo".to_string());

        assert_eq!(
            check(&[item]),
            vec![
                (
                    "A".to_string(),
                    "information in extra field not formatted as key:value pair: foo".to_string()
                ),
                ("A".to_string(), "a is too short as a citation key.".to_string()),
            ]
        );
    }

    #[test]
    fn child_after_parent_is_flagged() {
        let mut parent = attachment("A", None, "paper.pdf");
        parent.data.item_type = ItemType::Bibliographic("journalArticle".to_string());
        let child = attachment("B", Some("A"), "paper.pdf");

        assert_eq!(
            check(&[parent, child]),
            vec![(
                "B".to_string(),
                "does not comply with file naming convention: paper.pdf".to_string()
            )]
        );
    }

    #[test]
    fn child_before_parent_is_not_flagged_in_order() {
        let mut parent = attachment("A", None, "paper.pdf");
        parent.data.item_type = ItemType::Bibliographic("journalArticle".to_string());
        let child = attachment("B", Some("A"), "paper.pdf");

        assert!(check(&[child, parent]).is_empty());
    }

    #[test]
    fn whole_collection_resolution_ignores_order() {
        let mut parent = attachment("A", None, "paper.pdf");
        parent.data.item_type = ItemType::Bibliographic("journalArticle".to_string());
        let child = attachment("B", Some("A"), "paper.pdf");

        let validator =
            ConsistencyValidator::new().with_parent_resolution(ParentResolution::WholeCollection);
        assert_eq!(
            messages(&validator, &[child, parent]),
            vec![(
                "B".to_string(),
                "does not comply with file naming convention: paper.pdf".to_string()
            )]
        );
    }

    #[test]
    fn language_marker_and_snapshots_are_accepted() {
        let parent = article("P");
        let marked = attachment("B", Some("P"), "Doe2020--en--Study.pdf");
        let snapshot = attachment("C", Some("P"), "Snapshot.html");
        let mut titled_snapshot = attachment("D", Some("P"), "page.html");
        titled_snapshot.data.title = Some("Snapshot".to_string());
        let short_marker = attachment("E", Some("P"), "Doe2020--e--Study.pdf");

        assert_eq!(
            check(&[parent, marked, snapshot, titled_snapshot, short_marker]),
            vec![(
                "E".to_string(),
                "does not comply with file naming convention: Doe2020--e--Study.pdf".to_string()
            )]
        );
    }

    #[test]
    fn annotations_are_skipped_and_never_parents() {
        let mut annotation = ItemRecord::new("N", ItemType::Annotation);
        annotation.data.extra = Some("garbage".to_string());
        let child = attachment("B", Some("N"), "paper.pdf");

        assert!(check(&[annotation, child]).is_empty());
    }

    #[test]
    fn item_is_never_its_own_parent() {
        let own = attachment("B", Some("B"), "paper.pdf");
        assert!(check(&[own.clone()]).is_empty());

        let validator =
            ConsistencyValidator::new().with_parent_resolution(ParentResolution::WholeCollection);
        assert!(messages(&validator, &[own]).is_empty());
    }

    #[test]
    fn one_item_can_violate_several_rules() {
        let parent = article("P");
        let mut child = attachment("B", Some("P"), "paper.pdf");
        child.biblatex = "@misc{x}".to_string();
        child.data.extra = Some("Citation Key: x".to_string());

        let found = check(&[parent, child]);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|(key, _)| key == "B"));
    }

    #[test]
    fn report_is_identical_across_renders() {
        let mut first = article("A");
        first.data.tags.clear();
        first.biblatex = "@book{a}".to_string();
        let mut second = article("B");
        second.meta.created_by_user = Some(CreatedByUser {
            username: Some("bob".to_string()),
            ..Default::default()
        });
        second.data.extra = Some("Citation Key: b".to_string());
        let items = vec![first, second];

        let validator = ConsistencyValidator::new();
        let mut log = ProblemLog::new(LIBRARY_URL);
        validator.validate(&items, &mut log);
        let mut again = ProblemLog::new(LIBRARY_URL);
        validator.validate(&items, &mut again);

        let markdown = log.render().to_markdown();
        assert_eq!(markdown, again.render().to_markdown());
        let jane = markdown.find("### Jane Doe").unwrap();
        let bob = markdown.find("### bob").unwrap();
        assert!(jane < bob);
    }
}
