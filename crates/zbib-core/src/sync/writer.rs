//! Change-gated persistence of the mirror file and watermark.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::models::ItemRecord;
use crate::sync::atomic_write;
use crate::sync::fetcher::FetchOutcome;
use crate::sync::version_store::VersionStore;
use crate::Result;

/// JSON file holding the mirrored item collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFile {
    path: PathBuf,
}

impl MirrorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the mirrored records; a missing file is an empty mirror.
    pub fn load(&self) -> Result<Vec<ItemRecord>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the mirror contents atomically.
    pub fn save(&self, records: &[ItemRecord]) -> Result<()> {
        let serialized = serde_json::to_string_pretty(records)?;
        atomic_write(&self.path, serialized.as_bytes())
    }
}

/// What [`ChangeGatedWriter::commit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No new records; nothing was written.
    Unchanged,
    /// The mirror was rewritten. `watermark` is the version stored alongside,
    /// `None` when the previous watermark was kept.
    Written {
        records: usize,
        watermark: Option<u64>,
    },
}

/// Writes the mirror and watermark only when a fetch produced new records.
#[derive(Debug)]
pub struct ChangeGatedWriter<'a, S> {
    mirror: &'a MirrorFile,
    store: &'a S,
}

impl<'a, S: VersionStore> ChangeGatedWriter<'a, S> {
    pub const fn new(mirror: &'a MirrorFile, store: &'a S) -> Self {
        Self { mirror, store }
    }

    /// Write `outcome` to the mirror and advance the watermark.
    ///
    /// A complete fetch holds the whole listed collection and replaces the
    /// mirror; an interrupted one is overlaid onto it by key. The watermark
    /// moves only after a complete fetch and never backwards; it is written
    /// after the mirror.
    pub fn commit(&self, outcome: &FetchOutcome) -> Result<CommitOutcome> {
        if outcome.records.is_empty() {
            info!("no new records, leaving mirror and watermark untouched");
            return Ok(CommitOutcome::Unchanged);
        }

        let merged = if outcome.is_complete() {
            outcome.records.clone()
        } else {
            merge_records(self.mirror.load()?, &outcome.records)
        };
        self.mirror.save(&merged)?;
        info!(
            path = %self.mirror.path().display(),
            records = merged.len(),
            "mirror written"
        );

        let watermark = match (outcome.is_complete(), outcome.version) {
            (true, Some(version)) => {
                let previous = self.store.read();
                if version < previous {
                    warn!(version, previous, "refusing to move watermark backwards");
                    None
                } else {
                    self.store.write(version)?;
                    info!(version, "watermark advanced");
                    Some(version)
                }
            }
            _ => {
                warn!("fetch was incomplete, keeping previous watermark");
                None
            }
        };

        Ok(CommitOutcome::Written {
            records: merged.len(),
            watermark,
        })
    }
}

/// Overlay `fresh` onto `existing` by item key.
///
/// Existing order is kept, updated records replace their older copy in place
/// and unseen keys are appended in server order.
pub fn merge_records(mut existing: Vec<ItemRecord>, fresh: &[ItemRecord]) -> Vec<ItemRecord> {
    let mut positions: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(index, record)| (record.key().to_string(), index))
        .collect();

    for record in fresh {
        match positions.get(record.key()) {
            Some(&index) => existing[index] = record.clone(),
            None => {
                positions.insert(record.key().to_string(), existing.len());
                existing.push(record.clone());
            }
        }
    }

    existing
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::models::ItemType;
    use crate::sync::fetcher::FetchStatus;
    use crate::sync::source::FetchError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    /// In-memory store that records every write.
    #[derive(Default)]
    struct RecordingStore {
        value: RefCell<u64>,
        writes: RefCell<Vec<u64>>,
    }

    impl VersionStore for RecordingStore {
        fn read(&self) -> u64 {
            *self.value.borrow()
        }

        fn write(&self, version: u64) -> Result<()> {
            *self.value.borrow_mut() = version;
            self.writes.borrow_mut().push(version);
            Ok(())
        }
    }

    fn record(key: &str, title: &str) -> ItemRecord {
        let mut record = ItemRecord::new(key, ItemType::Bibliographic("book".to_string()));
        record.data.title = Some(title.to_string());
        record
    }

    fn outcome(min_version: u64, records: Vec<ItemRecord>, status: FetchStatus) -> FetchOutcome {
        FetchOutcome {
            min_version,
            version: Some(1300),
            records,
            status,
        }
    }

    fn titles(records: &[ItemRecord]) -> Vec<(String, String)> {
        records
            .iter()
            .map(|record| {
                (
                    record.key().to_string(),
                    record.data.title.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn unchanged_fetch_writes_nothing() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        mirror.save(&[record("A", "old")]).unwrap();
        let before = std::fs::read(mirror.path()).unwrap();
        let store = RecordingStore::default();

        let unchanged = FetchOutcome {
            min_version: 1200,
            version: Some(1200),
            records: Vec::new(),
            status: FetchStatus::Unchanged,
        };
        let writer = ChangeGatedWriter::new(&mirror, &store);
        assert_eq!(writer.commit(&unchanged).unwrap(), CommitOutcome::Unchanged);
        assert_eq!(writer.commit(&unchanged).unwrap(), CommitOutcome::Unchanged);

        assert!(store.writes.borrow().is_empty());
        assert_eq!(std::fs::read(mirror.path()).unwrap(), before);
    }

    #[test]
    fn complete_incremental_fetch_replaces_and_advances() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        mirror
            .save(&[record("A", "a1"), record("GONE", "deleted remotely")])
            .unwrap();
        let store = RecordingStore::default();
        *store.value.borrow_mut() = 1200;

        let fresh = vec![record("A", "a2"), record("C", "c1")];
        let result = ChangeGatedWriter::new(&mirror, &store)
            .commit(&outcome(1200, fresh, FetchStatus::Complete))
            .unwrap();

        assert_eq!(
            result,
            CommitOutcome::Written {
                records: 2,
                watermark: Some(1300)
            }
        );
        assert_eq!(
            titles(&mirror.load().unwrap()),
            vec![
                ("A".to_string(), "a2".to_string()),
                ("C".to_string(), "c1".to_string()),
            ]
        );
        assert_eq!(*store.writes.borrow(), vec![1300]);
    }

    #[test]
    fn interrupted_fetch_overlays_existing_mirror() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        mirror
            .save(&[record("A", "a1"), record("B", "b1")])
            .unwrap();
        let store = RecordingStore::default();
        *store.value.borrow_mut() = 1200;

        let partial = outcome(
            1200,
            vec![record("B", "b2"), record("C", "c1")],
            FetchStatus::Interrupted(FetchError::VersionChanged {
                expected: 1300,
                found: 1301,
            }),
        );
        ChangeGatedWriter::new(&mirror, &store)
            .commit(&partial)
            .unwrap();

        assert_eq!(
            titles(&mirror.load().unwrap()),
            vec![
                ("A".to_string(), "a1".to_string()),
                ("B".to_string(), "b2".to_string()),
                ("C".to_string(), "c1".to_string()),
            ]
        );
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn complete_full_fetch_replaces_mirror() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        mirror.save(&[record("GONE", "deleted remotely")]).unwrap();
        let store = RecordingStore::default();

        ChangeGatedWriter::new(&mirror, &store)
            .commit(&outcome(0, vec![record("A", "a1")], FetchStatus::Complete))
            .unwrap();

        assert_eq!(
            titles(&mirror.load().unwrap()),
            vec![("A".to_string(), "a1".to_string())]
        );
    }

    #[test]
    fn interrupted_fetch_keeps_records_but_not_watermark() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        let store = RecordingStore::default();
        *store.value.borrow_mut() = 1200;

        let partial = outcome(
            1200,
            vec![record("A", "a1")],
            FetchStatus::Interrupted(FetchError::Transport("timeout".to_string())),
        );
        let result = ChangeGatedWriter::new(&mirror, &store)
            .commit(&partial)
            .unwrap();

        assert_eq!(
            result,
            CommitOutcome::Written {
                records: 1,
                watermark: None
            }
        );
        assert_eq!(mirror.load().unwrap().len(), 1);
        assert!(store.writes.borrow().is_empty());
        assert_eq!(store.read(), 1200);
    }

    #[test]
    fn watermark_never_moves_backwards() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("bib.json"));
        let store = RecordingStore::default();
        *store.value.borrow_mut() = 5000;

        let result = ChangeGatedWriter::new(&mirror, &store)
            .commit(&outcome(1200, vec![record("A", "a1")], FetchStatus::Complete))
            .unwrap();

        assert_eq!(
            result,
            CommitOutcome::Written {
                records: 1,
                watermark: None
            }
        );
        assert_eq!(store.read(), 5000);
    }

    #[test]
    fn missing_mirror_loads_empty() {
        let dir = tempdir().unwrap();
        let mirror = MirrorFile::new(dir.path().join("absent.json"));
        assert!(mirror.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_mirror_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bib.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(MirrorFile::new(path).load().is_err());
    }
}
