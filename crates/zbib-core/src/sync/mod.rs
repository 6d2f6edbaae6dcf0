//! Incremental mirror of a Zotero library.
//!
//! A run reads the watermark, pages through everything newer than it and, when
//! new records arrived, merges them into the mirror file and advances the
//! watermark.

mod fetcher;
mod source;
mod version_store;
mod writer;
mod zotero;

use std::io::Write as _;
use std::path::Path;

use tracing::info;

use crate::Result;

pub use fetcher::{FetchOutcome, FetchStatus, IncrementalFetcher, PAGE_SIZE};
pub use source::{FetchError, ItemSource, PageRequest, PageResponse};
pub use version_store::{FileVersionStore, VersionStore};
pub use writer::{merge_records, ChangeGatedWriter, CommitOutcome, MirrorFile};
pub use zotero::ZoteroClient;

/// Summary of one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub previous_version: u64,
    pub fetched: usize,
    pub status: FetchStatus,
    pub commit: CommitOutcome,
}

/// Fetch changes since the stored watermark and commit them.
pub async fn sync_library<S, V>(
    source: &S,
    store: &V,
    mirror: &MirrorFile,
    tag: Option<String>,
) -> Result<SyncReport>
where
    S: ItemSource,
    V: VersionStore,
{
    let previous_version = store.read();
    info!(version = previous_version, "starting sync");

    let outcome = IncrementalFetcher::new(source)
        .with_tag(tag)
        .fetch(previous_version)
        .await;
    let commit = ChangeGatedWriter::new(mirror, store).commit(&outcome)?;

    Ok(SyncReport {
        previous_version,
        fetched: outcome.records.len(),
        status: outcome.status,
        commit,
    })
}

/// Replace `path` with `contents` so readers never see a partial file.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}
