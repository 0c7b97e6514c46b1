//! Upload ledger (uploaded_images.json)
//!
//! The ledger records every object the destination has acknowledged, either as
//! a fresh upload or as a duplicate, so later runs only submit new objects.
//! On disk it is a JSON array of object keys, written sorted.

use crate::error::{CliError, Result};
use rfimport_common::ObjectId;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Set of object keys already submitted, bound to the file it persists to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLedger {
    path: PathBuf,
    ids: BTreeSet<ObjectId>,
}

impl UploadLedger {
    /// Create an empty ledger that will be saved to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ids: BTreeSet::new(),
        }
    }

    /// Load the ledger at `path`.
    ///
    /// A missing file is an empty ledger. A file that exists but is not a
    /// JSON array of non-empty strings is [`CliError::CorruptLedger`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = match std::fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ledger yet, starting empty");
                return Ok(Self::new(path));
            }
            Err(e) => return Err(e.into()),
        };

        let ids: BTreeSet<ObjectId> = serde_json::from_slice(&content)
            .map_err(|e| CliError::corrupt_ledger(path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), entries = ids.len(), "Loaded ledger");

        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    /// Persist the ledger, replacing the previous file atomically.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the target, so a crash leaves either the old or the
    /// new ledger. An existing file keeps its permissions.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let content = serde_json::to_string_pretty(&self.ids)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.write_all(b"\n")?;
        if let Ok(existing) = std::fs::metadata(&self.path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), entries = self.ids.len(), "Saved ledger");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.ids.contains(id)
    }

    /// Add an identifier; returns false when it was already present
    pub fn add(&mut self, id: ObjectId) -> bool {
        self.ids.insert(id)
    }

    /// Remove an identifier; returns false when it was not present
    pub fn remove(&mut self, id: &ObjectId) -> bool {
        self.ids.remove(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectId> {
        self.ids.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn id(key: &str) -> ObjectId {
        ObjectId::new(key).unwrap()
    }

    #[test]
    fn test_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let ledger = UploadLedger::load(dir.path().join("uploaded_images.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();

        let cases: [&[u8]; 7] = [
            b"{not json",
            b"{\"a.jpg\": true}",
            b"[1, 2]",
            b"[\"\"]",
            b"",
            b"[\"\xff\xfe\"]",
            &[0xff, 0xfe],
        ];

        for content in cases {
            let path = dir.path().join("ledger.json");
            std::fs::write(&path, content).unwrap();

            let err = UploadLedger::load(&path).unwrap_err();
            assert!(
                matches!(err, CliError::CorruptLedger { .. }),
                "content {:?} gave {:?}",
                content,
                err
            );
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut ledger = UploadLedger::new("ledger.json");
        assert!(ledger.add(id("a.jpg")));
        assert!(!ledger.add(id("a.jpg")));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(&id("a.jpg")));
        assert!(!ledger.contains(&id("b.jpg")));
    }

    #[test]
    fn test_remove() {
        let mut ledger = UploadLedger::new("ledger.json");
        ledger.add(id("a.jpg"));
        assert!(ledger.remove(&id("a.jpg")));
        assert!(!ledger.remove(&id("a.jpg")));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_save_writes_sorted_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");

        let mut ledger = UploadLedger::new(&path);
        ledger.add(id("zebra.jpg"));
        ledger.add(id("cats/a.jpg"));
        ledger.save().unwrap();

        let on_disk: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, vec!["cats/a.jpg", "zebra.jpg"]);

        // No temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_save_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "[\"old.jpg\", \"keep.jpg\"]").unwrap();

        let mut ledger = UploadLedger::load(&path).unwrap();
        ledger.remove(&id("old.jpg"));
        ledger.add(id("new.jpg"));
        ledger.save().unwrap();

        let reloaded = UploadLedger::load(&path).unwrap();
        let keys: Vec<&str> = reloaded.iter().map(ObjectId::as_str).collect();
        assert_eq!(keys, vec!["keep.jpg", "new.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "[]").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut ledger = UploadLedger::load(&path).unwrap();
        ledger.add(id("a.jpg"));
        ledger.save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let ledger = UploadLedger::new(dir.path().join("missing").join("ledger.json"));
        assert!(matches!(ledger.save(), Err(CliError::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_save_load_round_trip(keys in proptest::collection::btree_set("[a-zA-Z0-9/._ -]{1,24}", 0..20)) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("ledger.json");

            let mut ledger = UploadLedger::new(&path);
            for key in &keys {
                ledger.add(id(key));
            }
            ledger.save().unwrap();

            let reloaded = UploadLedger::load(&path).unwrap();
            prop_assert_eq!(reloaded, ledger);
        }
    }
}
