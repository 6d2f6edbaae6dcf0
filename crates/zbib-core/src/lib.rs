//! zbib-core - Core library for zbib
//!
//! This crate contains the item models, the incremental sync protocol against
//! the Zotero web API, and the consistency checks used by the `zbib` CLI.

pub mod attachments;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod sync;
pub mod util;
pub mod validate;

pub use error::{Error, Result};
pub use models::{ItemRecord, ItemType};
