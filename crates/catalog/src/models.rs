use crate::TagDictionary;
use crate::error::{ErrorKind, Result};
use crate::tags::{ARCADE_TAG, GAMES_TAG, HBMAME_TAG, MAME_TAG};
use arcadedb_hashdb::Family;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DB_ID: &str = "arcade_roms_db";
const DOWNLOADER_TIMEOUT: u32 = 900;
const DOWNLOADER_RETRIES: u32 = 6;

/// Which shape catalog entries take.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// `{hash, size, url, tags}` for download clients.
    #[default]
    Standard,
    /// `{path, hash, version, size, hbmame, url}` for mirror diffing.
    Diff,
}

impl Layout {
    pub fn for_mirror_diff(enabled: bool) -> Self {
        if enabled { Layout::Diff } else { Layout::Standard }
    }
}

/// One downloadable archive.
///
/// Fields are declared in key order so the serialized entry is sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hbmame: Option<bool>,
    /// Mirror path (`<family>/<name>`), only in the diff layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u32>>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Everything known about an archive once it has been resolved.
pub(crate) struct Located<'a> {
    pub family: Family,
    pub name: &'a str,
    pub md5: &'a str,
    pub size: u64,
    pub url: String,
    pub version: &'a str,
}

impl CatalogEntry {
    pub(crate) fn new(layout: Layout, located: Located<'_>, core_tag: Option<u32>) -> Self {
        let Located { family, name, md5, size, url, version } = located;
        match layout {
            Layout::Standard => {
                let family_tag = match family {
                    Family::Mame => MAME_TAG,
                    Family::HbMame => HBMAME_TAG,
                };
                let tags = [family_tag, GAMES_TAG, ARCADE_TAG].into_iter().chain(core_tag).collect();
                Self {
                    hash: md5.to_string(),
                    hbmame: None,
                    path: None,
                    size,
                    tags: Some(tags),
                    url,
                    version: None,
                }
            },
            Layout::Diff => Self {
                hash: md5.to_string(),
                hbmame: Some(family == Family::HbMame),
                path: Some(family.qualify(name)),
                size,
                tags: None,
                url,
                version: Some(version.to_string()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOptions {
    pub downloader_retries: u32,
    pub downloader_timeout: u32,
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self { downloader_retries: DOWNLOADER_RETRIES, downloader_timeout: DOWNLOADER_TIMEOUT }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub tags: Vec<u32>,
}

/// The published database document.
///
/// Fields are declared in key order so the serialized document is sorted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub db_id: String,
    pub default_options: DefaultOptions,
    /// Logical path (`|games/<family>/<name>`) to entry.
    pub files: BTreeMap<String, CatalogEntry>,
    pub folders: BTreeMap<String, Folder>,
    pub tag_dictionary: TagDictionary,
    /// Unix seconds.
    pub timestamp: i64,
}

impl Database {
    pub fn new(files: BTreeMap<String, CatalogEntry>, tag_dictionary: TagDictionary, timestamp: i64) -> Self {
        let folders = [
            ("|games", vec![GAMES_TAG]),
            ("|games/mame", vec![MAME_TAG, GAMES_TAG]),
            ("|games/hbmame", vec![HBMAME_TAG, GAMES_TAG]),
        ]
        .into_iter()
        .map(|(path, tags)| (path.to_string(), Folder { tags }))
        .collect();
        Self {
            db_id: DB_ID.to_string(),
            default_options: DefaultOptions::default(),
            files,
            folders,
            tag_dictionary,
            timestamp,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            exn::bail!(ErrorKind::MissingInput(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidDatabase(path.to_path_buf()))
    }
}

/// Logical catalog path of an archive.
pub fn logical_path(family: Family, name: &str) -> String {
    format!("|games/{}/{name}", family.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(family: Family) -> Located<'static> {
        Located {
            family,
            name: "foo.zip",
            md5: "abc123",
            size: 1024,
            url: "https://m/0220/foo.zip".to_string(),
            version: "0220",
        }
    }

    #[test]
    fn test_standard_entry() {
        let entry = CatalogEntry::new(Layout::Standard, located(Family::Mame), Some(5));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({"hash": "abc123", "size": 1024, "url": "https://m/0220/foo.zip", "tags": [0, 2, 3, 5]})
        );
        let entry = CatalogEntry::new(Layout::Standard, located(Family::HbMame), None);
        assert_eq!(entry.tags, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_diff_entry() {
        let entry = CatalogEntry::new(Layout::Diff, located(Family::HbMame), Some(5));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({
                "path": "hbmame/foo.zip",
                "hash": "abc123",
                "version": "0220",
                "size": 1024,
                "hbmame": true,
                "url": "https://m/0220/foo.zip"
            })
        );
    }

    #[test]
    fn test_fixed_document_parts() {
        let database = Database::new(BTreeMap::new(), TagDictionary::default(), 42);
        let json = serde_json::to_string(&database).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"db_id":"arcade_roms_db","#,
                r#""default_options":{"downloader_retries":6,"downloader_timeout":900},"#,
                r#""files":{},"#,
                r#""folders":{"|games":{"tags":[2]},"|games/hbmame":{"tags":[1,2]},"|games/mame":{"tags":[0,2]}},"#,
                r#""tag_dictionary":{"arcade":3,"arcadecores":3,"games":2,"hbmame":1,"mame":0},"#,
                r#""timestamp":42}"#
            )
        );
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut files = BTreeMap::new();
        files.insert(
            logical_path(Family::Mame, "foo.zip"),
            CatalogEntry::new(Layout::Diff, located(Family::Mame), None),
        );
        let database = Database::new(files, TagDictionary::default(), 1);
        std::fs::write(&path, serde_json::to_vec(&database).unwrap()).unwrap();
        assert_eq!(Database::load(&path).unwrap(), database);
    }
}
