use crate::error::{ErrorKind, Result};
use arcadedb_hashdb::Family;
use exn::ResultExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::instrument;

/// Where descriptors and archives come from.
///
/// ```json
/// {
///     "mra": {"https://example.com/pack.zip": "_Arcade/*"},
///     "mame": {"0220": "https://example.com/mame-0220/"},
///     "hbmame": {"0220": "https://example.com/hbmame-0220/"}
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SourceManifest {
    /// Descriptor pack URL mapped to the entry (or glob) to extract from it.
    #[serde(default)]
    pub mra: BTreeMap<String, String>,
    /// Mirror base URL per official release.
    #[serde(default)]
    pub mame: BTreeMap<String, String>,
    /// Mirror base URL per homebrew release.
    #[serde(default)]
    pub hbmame: BTreeMap<String, String>,
}

impl SourceManifest {
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::MissingInput(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        let manifest: Self =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidManifest(path.to_path_buf()))?;
        tracing::debug!(
            packs = manifest.mra.len(),
            mame = manifest.mame.len(),
            hbmame = manifest.hbmame.len(),
            "Loaded source manifest"
        );
        Ok(manifest)
    }

    /// Mirror base URL for a family release, if one is configured.
    pub fn base_url(&self, family: Family, version: &str) -> Option<&str> {
        let urls = match family {
            Family::Mame => &self.mame,
            Family::HbMame => &self.hbmame,
        };
        urls.get(version).map(String::as_str)
    }

    /// Descriptor packs as (URL, in-archive path) pairs.
    pub fn packs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mra.iter().map(|(url, entry)| (url.as_str(), entry.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arcade_sources.json");
        std::fs::write(
            &path,
            r#"{"mra": {"https://example.com/pack.zip": "_Arcade/*"}, "mame": {"0220": "https://m/0220/"}}"#,
        )
        .unwrap();
        let manifest = SourceManifest::load(&path).unwrap();
        assert_eq!(manifest.packs().collect::<Vec<_>>(), [("https://example.com/pack.zip", "_Arcade/*")]);
        assert_eq!(manifest.base_url(Family::Mame, "0220"), Some("https://m/0220/"));
        assert_eq!(manifest.base_url(Family::HbMame, "0220"), None);
        assert_eq!(manifest.base_url(Family::Mame, "0245"), None);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arcade_sources.json");
        assert_eq!(*SourceManifest::load(&path).unwrap_err(), ErrorKind::MissingInput(path));
    }

    #[test]
    fn test_load_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arcade_sources.json");
        std::fs::write(&path, r#"{"mame": ["not", "a", "map"]}"#).unwrap();
        assert_eq!(*SourceManifest::load(&path).unwrap_err(), ErrorKind::InvalidManifest(path));
    }
}
