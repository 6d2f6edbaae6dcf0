//! Selection of PDF attachments to download for a set of records.

use std::collections::HashSet;
use std::path::Path;

use crate::models::{ItemRecord, ItemType};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One attachment file to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDownload {
    pub attachment_key: String,
    pub parent_key: String,
    /// Bare file name, safe to join onto an output directory.
    pub file_name: String,
}

/// PDF attachments whose parent record matches `tag` (every record when `None`).
pub fn select_pdf_attachments(items: &[ItemRecord], tag: Option<&str>) -> Vec<AttachmentDownload> {
    let matching: HashSet<&str> = items
        .iter()
        .filter(|item| item.item_type().is_bibliographic())
        .filter(|item| tag.map_or(true, |tag| item.has_tag(tag)))
        .map(ItemRecord::key)
        .collect();

    items
        .iter()
        .filter(|item| *item.item_type() == ItemType::Attachment)
        .filter(|item| item.data.content_type.as_deref() == Some(PDF_CONTENT_TYPE))
        .filter_map(|item| {
            let parent = item.parent_key().filter(|parent| matching.contains(parent))?;
            Some(AttachmentDownload {
                attachment_key: item.key().to_string(),
                parent_key: parent.to_string(),
                file_name: attachment_file_name(item),
            })
        })
        .collect()
}

fn attachment_file_name(item: &ItemRecord) -> String {
    item.data
        .filename
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.trim().is_empty())
        .map_or_else(|| format!("{}.pdf", item.key()), ToOwned::to_owned)
}
