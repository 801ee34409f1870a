use crate::Snapshot;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Somewhere snapshot documents can be loaded from, by file name.
pub trait SnapshotSource {
    /// Loads the named snapshot document.
    ///
    /// An absent document is `Ok(None)`; a document that exists but cannot be
    /// read or parsed is an error.
    fn load(&self, file_name: &str) -> Result<Option<Snapshot>>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn load(&self, file_name: &str) -> Result<Option<Snapshot>> {
        (**self).load(file_name)
    }
}

/// Snapshot documents stored as files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SnapshotSource for DirectorySource {
    fn load(&self, file_name: &str) -> Result<Option<Snapshot>> {
        Snapshot::load(&self.root.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("0220.json"), r#"{"foo.zip": {"md5": "abc", "size": 3}}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let source = DirectorySource::new(dir.path());

        let snapshot = source.load("0220.json").unwrap().unwrap();
        assert_eq!(snapshot.get("foo.zip").unwrap().size, 3);
        assert!(source.load("mamemerged0220.json").unwrap().is_none());
        let err = source.load("broken.json").unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidSnapshot(_)));
    }
}
