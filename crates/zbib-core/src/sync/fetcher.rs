//! Version-gated, paginated retrieval of the item collection.

use tracing::{debug, error, info, warn};

use crate::models::ItemRecord;
use crate::sync::source::{FetchError, ItemSource, PageRequest, PageResponse};

/// Records requested per page.
pub const PAGE_SIZE: usize = 100;

/// How a fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// The library has not changed since the watermark.
    Unchanged,
    /// Every page was retrieved.
    Complete,
    /// Pagination stopped early; records from earlier pages are kept.
    Interrupted(FetchError),
}

/// Result of [`IncrementalFetcher::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub min_version: u64,
    /// Library version reported with the first page, or `min_version` when
    /// unchanged.
    pub version: Option<u64>,
    /// Records in server order.
    pub records: Vec<ItemRecord>,
    pub status: FetchStatus,
}

impl FetchOutcome {
    const fn unchanged(min_version: u64) -> Self {
        Self {
            min_version,
            version: Some(min_version),
            records: Vec::new(),
            status: FetchStatus::Unchanged,
        }
    }

    pub const fn is_complete(&self) -> bool {
        matches!(self.status, FetchStatus::Complete)
    }

    pub const fn is_unchanged(&self) -> bool {
        matches!(self.status, FetchStatus::Unchanged)
    }
}

/// Pages through an [`ItemSource`] starting from a watermark.
#[derive(Debug)]
pub struct IncrementalFetcher<'a, S> {
    source: &'a S,
    tag: Option<String>,
}

impl<'a, S: ItemSource> IncrementalFetcher<'a, S> {
    pub const fn new(source: &'a S) -> Self {
        Self { source, tag: None }
    }

    /// Only list items carrying `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    /// Fetch everything that changed after `min_version`.
    ///
    /// Transport and remote failures end pagination instead of failing the
    /// call; the outcome then carries the records fetched so far.
    pub async fn fetch(&self, min_version: u64) -> FetchOutcome {
        let mut offset = 0usize;
        let mut version: Option<u64> = None;
        let mut records = Vec::new();

        let status = loop {
            debug!(offset, min_version, "requesting page");
            let request = PageRequest {
                min_version,
                offset,
                limit: PAGE_SIZE,
                tag: self.tag.clone(),
            };

            match self.source.fetch_page(&request).await {
                Ok(PageResponse::NotModified) if offset == 0 => {
                    info!(version = min_version, "no change");
                    return FetchOutcome::unchanged(min_version);
                }
                Ok(PageResponse::NotModified) => {
                    break FetchStatus::Interrupted(FetchError::UnexpectedNotModified { offset });
                }
                Ok(PageResponse::Modified {
                    version: page_version,
                    records: page,
                }) => {
                    let Some(page_version) = page_version else {
                        break FetchStatus::Interrupted(FetchError::MissingVersion);
                    };
                    match version {
                        None => {
                            info!(version = page_version, "downloading new version of library");
                            version = Some(page_version);
                        }
                        Some(expected) if expected != page_version => {
                            break FetchStatus::Interrupted(FetchError::VersionChanged {
                                expected,
                                found: page_version,
                            });
                        }
                        Some(_) => {}
                    }

                    let count = page.len();
                    info!(offset, records = count, "received page");
                    if count == 0 {
                        break FetchStatus::Complete;
                    }
                    records.extend(page);
                    if count < PAGE_SIZE {
                        break FetchStatus::Complete;
                    }
                    offset += PAGE_SIZE;
                }
                Err(error) => break FetchStatus::Interrupted(error),
            }
        };

        if let FetchStatus::Interrupted(reason) = &status {
            match reason {
                FetchError::Transport(_) | FetchError::Remote { .. } => {
                    error!(offset, %reason, kept = records.len(), "pagination stopped");
                }
                _ => warn!(offset, %reason, kept = records.len(), "pagination stopped"),
            }
        }

        FetchOutcome {
            min_version,
            version,
            records,
            status,
        }
    }
}
