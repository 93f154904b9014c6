//! On-disk store for serialized navigation history.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rally_core::Result;
use tracing::debug;

/// A single file holding the last saved navigation history.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store backed by `path`. Nothing is touched until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved bytes. `Ok(None)` if nothing was saved yet.
    pub fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), len = bytes.len(), "navigation state loaded");
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(err, "reading")),
        }
    }

    /// Replace the saved bytes.
    pub fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e, "creating directory for"))?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes).map_err(|e| self.io_error(e, "writing"))?;
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err, "replacing"));
        }
        debug!(path = %self.path.display(), len = bytes.len(), "navigation state saved");
        Ok(())
    }

    /// Delete the saved state. Missing state is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err, "removing")),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, err: io::Error, action: &str) -> rally_core::RallyError {
        rally_core::RallyError::from(err).with_context(format!("{action} {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rally_core::RallyError;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nav.cbor"));
        assert_eq!(store.load().unwrap(), None);
        assert!(store.clear().is_ok());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("nested/dir/nav.cbor"));
        store.save(b"first").unwrap();
        store.save(b"second").unwrap();
        assert_eq!(store.load().unwrap(), Some(b"second".to_vec()));
        assert!(!dir.path().join("nested/dir/nav.cbor.tmp").exists());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn directory_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path());
        assert_matches!(store.load(), Err(RallyError::Storage { .. } | RallyError::PermissionDenied { .. }));
    }
}
