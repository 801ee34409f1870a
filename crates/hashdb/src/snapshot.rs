//! Hash snapshot documents.

use crate::Family;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::instrument;

/// Reserved key holding archives the snapshot builder refused to hash.
pub const SKIP_LIST_KEY: &str = "0000_skip_list";

/// Verified metadata of one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub md5: String,
    pub size: u64,
    /// Sub-path on the mirror when it differs from the archive name.
    ///
    /// May be absent, but never `null`.
    #[serde(default, deserialize_with = "present_string", skip_serializing_if = "Option::is_none")]
    pub fullpath: Option<String>,
}

fn present_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    String::deserialize(deserializer).map(Some)
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Entry {
    Record(HashRecord),
    SkipList(Vec<String>),
}

/// All verified archives for one (family, version) pair.
///
/// Keys are either bare archive names (`foo.zip`) or family-qualified paths
/// (`mame/foo.zip`). Iteration and serialization are in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Entry>", into = "BTreeMap<String, Entry>")]
pub struct Snapshot {
    records: BTreeMap<String, HashRecord>,
    skip_list: Vec<String>,
}

impl TryFrom<BTreeMap<String, Entry>> for Snapshot {
    type Error = String;
    fn try_from(entries: BTreeMap<String, Entry>) -> std::result::Result<Self, Self::Error> {
        let mut snapshot = Snapshot::default();
        for (key, entry) in entries {
            match (key == SKIP_LIST_KEY, entry) {
                (true, Entry::SkipList(list)) => snapshot.skip_list = list,
                (false, Entry::Record(record)) => {
                    snapshot.records.insert(key, record);
                },
                (true, Entry::Record(_)) => return Err(format!("`{SKIP_LIST_KEY}` must be a list of names")),
                (false, Entry::SkipList(_)) => return Err(format!("`{key}` is not a hash record")),
            }
        }
        Ok(snapshot)
    }
}

impl From<Snapshot> for BTreeMap<String, Entry> {
    fn from(snapshot: Snapshot) -> Self {
        let mut entries: BTreeMap<_, _> =
            snapshot.records.into_iter().map(|(key, record)| (key, Entry::Record(record))).collect();
        if !snapshot.skip_list.is_empty() {
            entries.insert(SKIP_LIST_KEY.to_string(), Entry::SkipList(snapshot.skip_list));
        }
        entries
    }
}

impl FromIterator<(String, HashRecord)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (String, HashRecord)>>(iter: T) -> Self {
        Self { records: iter.into_iter().collect(), skip_list: Vec::new() }
    }
}

impl Snapshot {
    /// Parses a snapshot document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice(bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => exn::bail!(ErrorKind::InvalidSnapshot(e.to_string())),
        }
    }

    /// Loads the snapshot at `path`, or `None` when there is no such file.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            tracing::debug!("Snapshot not present");
            return Ok(None);
        }
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        let snapshot = Self::from_slice(&bytes).or_raise(|| ErrorKind::InvalidSnapshot(path.display().to_string()))?;
        tracing::debug!(records = snapshot.len(), "Snapshot loaded");
        Ok(Some(snapshot))
    }

    /// Writes the snapshot with sorted keys and four-space indentation.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut output = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        std::fs::write(path, output).or_raise(|| ErrorKind::Io(path.to_path_buf()))
    }

    pub fn get(&self, key: &str) -> Option<&HashRecord> {
        self.records.get(key)
    }

    /// Finds an archive by bare name, then by family-qualified path.
    ///
    /// Returns the key that matched alongside the record.
    pub fn find(&self, family: Family, archive: &str) -> Option<(String, &HashRecord)> {
        if let Some(record) = self.records.get(archive) {
            return Some((archive.to_string(), record));
        }
        let qualified = family.qualify(archive);
        self.records.get(&qualified).map(|record| (qualified, record))
    }

    pub fn insert(&mut self, key: impl Into<String>, record: HashRecord) -> Option<HashRecord> {
        self.records.insert(key.into(), record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashRecord)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skip_list(&self) -> &[String] {
        &self.skip_list
    }

    /// Marks an archive as deliberately not hashed.
    pub fn skip(&mut self, archive: impl Into<String>) {
        let archive = archive.into();
        if !self.skip_list.contains(&archive) {
            self.skip_list.push(archive);
        }
    }
}
