//! Biblatex export of the mirrored library.
//!
//! Better BibTeX stores fields Zotero has no slot for as `tex.<field>: <value>`
//! lines in the extra field. The export folds them back into the entry.

use std::fmt::Write as _;

use tracing::warn;

use crate::models::ItemRecord;

const TEX_FIELD_PREFIX: &str = "tex.";

/// Render the biblatex entries of `items`, optionally only those tagged `tag`.
///
/// Items whose payload is a short placeholder are skipped.
pub fn render_biblatex_export(items: &[ItemRecord], tag: Option<&str>) -> String {
    let mut output = String::new();

    for item in items {
        if !item.has_biblatex() {
            continue;
        }
        if tag.is_some_and(|tag| !item.has_tag(tag)) {
            continue;
        }

        let entry = match item.data.extra.as_deref().filter(|extra| !extra.is_empty()) {
            Some(extra) => restore_tex_fields(item.key(), &item.biblatex, extra),
            None => item.biblatex.clone(),
        };
        output.push_str(&entry);
        output.push('\n');
    }

    output
}

/// Re-insert `tex.*` extra lines as biblatex fields before the closing brace.
pub fn restore_tex_fields(item_key: &str, biblatex: &str, extra: &str) -> String {
    let cut = biblatex
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(index, _)| index);
    let mut entry = biblatex[..cut].to_string();

    for line in extra.lines() {
        let Some(payload) = line.strip_prefix(TEX_FIELD_PREFIX) else {
            continue;
        };
        match payload.split_once(": ") {
            Some((field, value)) => {
                let _ = write!(entry, "\n\t{field} = {{{value}}},");
            }
            None => warn!(item = item_key, line, "skipping malformed tex field"),
        }
    }

    entry.push_str("\n}");
    entry
}
