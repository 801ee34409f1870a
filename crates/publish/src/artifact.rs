use crate::diff::to_pretty_json;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::instrument;

const ZIP_EXTENSION: &str = ".zip";

/// The persisted form of a database: a pretty JSON file plus a ZIP archive
/// holding the same document under the JSON file's name.
///
/// # Examples
///
/// ```
/// use arcadedb_publish::Artifact;
/// use std::path::Path;
///
/// let artifact = Artifact::from_zip("out/arcade_roms_db.json.zip");
/// assert_eq!(artifact.json_path(), Path::new("out/arcade_roms_db.json"));
/// assert_eq!(artifact.entry_name(), "arcade_roms_db.json");
///
/// let local = Artifact::from_json("local.json");
/// assert_eq!(local.zip_path(), Path::new("local.json.zip"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    json: PathBuf,
    zip: PathBuf,
}

impl Artifact {
    /// Artifact named after its ZIP file (`<name>.json.zip`).
    pub fn from_zip(zip: impl Into<PathBuf>) -> Self {
        let zip = zip.into();
        let json = match zip.to_str().and_then(|path| path.strip_suffix(ZIP_EXTENSION)) {
            Some(stem) => PathBuf::from(stem),
            None => zip.with_extension(""),
        };
        Self { json, zip }
    }

    /// Artifact named after its JSON file; the archive sits next to it.
    pub fn from_json(json: impl Into<PathBuf>) -> Self {
        let json = json.into();
        let mut zip = json.clone().into_os_string();
        zip.push(ZIP_EXTENSION);
        Self { json, zip: PathBuf::from(zip) }
    }

    pub fn json_path(&self) -> &Path {
        &self.json
    }

    pub fn zip_path(&self) -> &Path {
        &self.zip
    }

    /// Name of the JSON entry inside the archive.
    pub fn entry_name(&self) -> String {
        self.json.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Writes both files.
    #[instrument(skip_all, fields(json = %self.json.display(), zip = %self.zip.display()))]
    pub fn save<T: Serialize + ?Sized>(&self, document: &T) -> Result<()> {
        let compact = serde_json::to_vec(document).or_raise(|| ErrorKind::Serialize)?;
        let archive = arcadedb_compress::zip_single(&self.entry_name(), &compact).or_raise(|| ErrorKind::Serialize)?;
        std::fs::write(&self.zip, archive).or_raise(|| ErrorKind::Io(self.zip.clone()))?;
        let pretty = to_pretty_json(document)?;
        std::fs::write(&self.json, pretty).or_raise(|| ErrorKind::Io(self.json.clone()))?;
        tracing::info!("Saved database");
        Ok(())
    }

    /// Reads the document out of a downloaded copy of this artifact's archive.
    pub fn read_zipped(&self, archive: &Path) -> Result<Value> {
        let bytes = std::fs::read(archive).or_raise(|| ErrorKind::Io(archive.to_path_buf()))?;
        let contents = arcadedb_compress::read_entry(&bytes, &self.entry_name())
            .or_raise(|| ErrorKind::InvalidArtifact(archive.to_path_buf()))?;
        serde_json::from_slice(&contents).or_raise(|| ErrorKind::InvalidArtifact(archive.to_path_buf()))
    }
}
