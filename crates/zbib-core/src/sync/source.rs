//! Paged access to the remote item collection.

use thiserror::Error;

use crate::models::ItemRecord;

/// Parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Only answer with data if the library changed after this version.
    pub min_version: u64,
    /// Zero-based index of the first record.
    pub offset: usize,
    pub limit: usize,
    pub tag: Option<String>,
}

/// Successful answer to a page request.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResponse {
    /// The library changed; `version` is the current library version.
    Modified {
        version: Option<u64>,
        records: Vec<ItemRecord>,
    },
    /// Nothing changed since `min_version`.
    NotModified,
}

/// Why pagination stopped early.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Remote error: HTTP {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("Invalid item payload: {0}")]
    InvalidPayload(String),
    #[error("Response did not include a usable Last-Modified-Version")]
    MissingVersion,
    #[error("Library version changed while paging (expected {expected}, found {found})")]
    VersionChanged { expected: u64, found: u64 },
    #[error("Unexpected not-modified response at offset {offset}")]
    UnexpectedNotModified { offset: usize },
}

/// A remote item collection that can be listed page by page.
#[allow(async_fn_in_trait)]
pub trait ItemSource {
    /// Request a single page. One call is in flight at a time.
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError>;
}
