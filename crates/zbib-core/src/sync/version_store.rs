//! Persistence of the sync watermark.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::sync::atomic_write;
use crate::Result;

/// Storage for the last synchronized library version.
///
/// Implementations do not enforce monotonicity; callers must.
pub trait VersionStore {
    /// Last known watermark, `0` when none was stored or it cannot be read.
    fn read(&self) -> u64;

    /// Persist `version`, replacing any previous value.
    fn write(&self, version: u64) -> Result<()>;
}

/// Watermark kept as a plain-text integer in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileVersionStore {
    path: PathBuf,
}

impl FileVersionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionStore for FileVersionStore {
    fn read(&self) -> u64 {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "failed to read version file");
                return 0;
            }
        };

        raw.trim().parse().unwrap_or_else(|error| {
            warn!(path = %self.path.display(), %error, "version file is not an integer");
            0
        })
    }

    fn write(&self, version: u64) -> Result<()> {
        atomic_write(&self.path, version.to_string().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempdir().unwrap();
        let store = FileVersionStore::new(dir.path().join("version"));
        assert_eq!(store.read(), 0);
    }

    #[test]
    fn garbage_reads_as_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version");
        std::fs::write(&path, "not a number").unwrap();
        assert_eq!(FileVersionStore::new(path).read(), 0);
    }

    #[test]
    fn write_then_read() {
        let dir = tempdir().unwrap();
        let store = FileVersionStore::new(dir.path().join("version"));
        store.write(1291).unwrap();
        assert_eq!(store.read(), 1291);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "1291");

        store.write(1300).unwrap();
        assert_eq!(store.read(), 1300);
    }

    #[test]
    fn trailing_newline_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version");
        std::fs::write(&path, "42\n").unwrap();
        assert_eq!(FileVersionStore::new(path).read(), 42);
    }
}
