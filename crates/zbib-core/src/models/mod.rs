//! Data models for zbib

mod item;

pub use item::{
    CreatedByUser, ItemData, ItemMeta, ItemRecord, ItemTag, ItemType,
    BIBLATEX_PLACEHOLDER_MAX_LEN,
};
