//! Item model
//!
//! Mirrors the JSON records returned by the Zotero web API with
//! `format=json&include=data,biblatex`. Fields the checks do not use are kept
//! in flattened maps so a record written back to the mirror loses nothing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder biblatex payloads up to this length mean "no entry".
pub const BIBLATEX_PLACEHOLDER_MAX_LEN: usize = 3;

/// Kind of a library item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemType {
    Attachment,
    Note,
    Annotation,
    /// Any bibliographic type (`journalArticle`, `book`, ...)
    Bibliographic(String),
}

impl ItemType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Attachment => "attachment",
            Self::Note => "note",
            Self::Annotation => "annotation",
            Self::Bibliographic(kind) => kind,
        }
    }

    /// Whether this is a regular bibliographic record rather than a child record.
    #[must_use]
    pub const fn is_bibliographic(&self) -> bool {
        matches!(self, Self::Bibliographic(_))
    }
}

impl From<String> for ItemType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "attachment" => Self::Attachment,
            "note" => Self::Note,
            "annotation" => Self::Annotation,
            _ => Self::Bibliographic(value),
        }
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Bibliographic(kind) => kind,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag attached to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTag {
    pub tag: String,
    /// Zotero tag type (0 manual, 1 automatic)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
}

impl ItemTag {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            kind: None,
        }
    }
}

/// User that created an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedByUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl CreatedByUser {
    /// Display name when non-empty, otherwise the account handle.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                self.username
                    .as_deref()
                    .filter(|username| !username.trim().is_empty())
            })
    }
}

/// Server-side metadata of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(
        rename = "createdByUser",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by_user: Option<CreatedByUser>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Editable item fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub key: String,
    #[serde(default)]
    pub version: u64,
    #[serde(rename = "itemType")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<ItemTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "parentItem", default, skip_serializing_if = "Option::is_none")]
    pub parent_item: Option<String>,
    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One record of the library as listed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub meta: ItemMeta,
    pub data: ItemData,
    /// Rendered citation; short placeholders mean "no entry"
    #[serde(default)]
    pub biblatex: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ItemRecord {
    /// Create a minimal record, mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(key: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            meta: ItemMeta::default(),
            data: ItemData {
                key: key.into(),
                version: 0,
                item_type,
                title: None,
                tags: Vec::new(),
                extra: None,
                filename: None,
                parent_item: None,
                content_type: None,
                other: Map::new(),
            },
            biblatex: String::new(),
            other: Map::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.data.key
    }

    #[must_use]
    pub const fn item_type(&self) -> &ItemType {
        &self.data.item_type
    }

    #[must_use]
    pub fn parent_key(&self) -> Option<&str> {
        self.data.parent_item.as_deref()
    }

    /// Key the web UI should open for this record: the parent for child records.
    #[must_use]
    pub fn link_key(&self) -> &str {
        self.parent_key().unwrap_or_else(|| self.key())
    }

    /// Resolved creator name, if the server reported one.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.meta
            .created_by_user
            .as_ref()
            .and_then(CreatedByUser::display_name)
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.data.tags.iter().any(|candidate| candidate.tag == tag)
    }

    /// Whether the biblatex payload is a real entry rather than a placeholder.
    #[must_use]
    pub fn has_biblatex(&self) -> bool {
        self.biblatex.chars().count() > BIBLATEX_PLACEHOLDER_MAX_LEN
    }
}
