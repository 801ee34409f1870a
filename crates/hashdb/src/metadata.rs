//! Building snapshots from archive mirror metadata listings.

use crate::error::{ErrorKind, Result};
use crate::{HashRecord, Snapshot};
use exn::ResultExt;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

const METADATA_ENDPOINT: &str = "https://archive.org/metadata/";
const ZIP_FORMAT: &str = "zip";

static SOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| RegexBuilder::new(r"^[-_a-z0-9.%/\[\]]+$").case_insensitive(true).build().unwrap());

/// An archive mirror item, optionally narrowed to one directory inside it.
///
/// # Examples
///
/// ```
/// use arcadedb_hashdb::MirrorSource;
///
/// let source = MirrorSource::parse("mame-merged/roms").unwrap();
/// assert_eq!(source.item(), "mame-merged");
/// assert_eq!(source.subdir(), Some("roms"));
/// assert_eq!(source.metadata_url(), "https://archive.org/metadata/mame-merged");
///
/// assert!(MirrorSource::parse("https://example.com/").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorSource {
    item: String,
    subdir: Option<String>,
}

impl MirrorSource {
    /// Parses `<item>[/<subdir>]`.
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if !SOURCE_PATTERN.is_match(source) {
            exn::bail!(ErrorKind::InvalidSource(source.to_string()));
        }
        Ok(match source.split_once('/') {
            Some((item, subdir)) => Self { item: item.to_string(), subdir: Some(subdir.to_string()) },
            None => Self { item: source.to_string(), subdir: None },
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    /// Where the item's metadata listing is published.
    pub fn metadata_url(&self) -> String {
        format!("{METADATA_ENDPOINT}{}", self.item)
    }
}

/// The subset of an item's metadata listing needed for hashing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ArchiveMetadata {
    #[serde(default)]
    pub files: Vec<MetadataFile>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MetadataFile {
    pub name: Option<String>,
    pub format: Option<String>,
    pub md5: Option<String>,
    pub size: Option<MetadataSize>,
}

/// Listings report sizes as strings, but plain numbers are accepted too.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum MetadataSize {
    Number(u64),
    Text(String),
}

impl MetadataSize {
    fn bytes(&self) -> Option<u64> {
        match self {
            MetadataSize::Number(size) => Some(*size),
            MetadataSize::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl ArchiveMetadata {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                tracing::error!(error = %e, "Unparsable metadata listing");
                exn::bail!(ErrorKind::InvalidMetadata)
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        Self::from_slice(&bytes)
    }
}

/// Records every zipped file of the listing in `snapshot`, keyed by file name.
///
/// Files outside `subdir` (when given) and files that are not ZIP archives are
/// skipped, as are names on the snapshot's skip list. Returns the number of
/// records written.
pub fn merge_metadata(snapshot: &mut Snapshot, metadata: &ArchiveMetadata, subdir: Option<&str>) -> usize {
    let mut merged = 0;
    for file in &metadata.files {
        let Some(name) = file.name.as_deref() else {
            continue;
        };
        let is_zip = file.format.as_deref().is_some_and(|format| format.trim().eq_ignore_ascii_case(ZIP_FORMAT));
        if !is_zip || subdir.is_some_and(|dir| !name.starts_with(dir)) {
            tracing::debug!(name, "Skip");
            continue;
        }
        let Some(md5) = file.md5.as_deref().map(str::trim) else {
            tracing::warn!(name, "Listing entry has no checksum, skipping");
            continue;
        };
        let Some(size) = file.size.as_ref().and_then(MetadataSize::bytes) else {
            tracing::warn!(name, size = ?file.size, "Listing entry has no usable size, skipping");
            continue;
        };
        let key = name.rsplit('/').next().unwrap_or(name);
        if snapshot.skip_list().iter().any(|skipped| skipped == key) {
            tracing::info!(name, "Skip-listed, not recording");
            continue;
        }
        tracing::info!(name, "Hashed");
        snapshot.insert(key, HashRecord { md5: md5.to_string(), size, fullpath: Some(name.to_string()) });
        merged += 1;
    }
    merged
}
