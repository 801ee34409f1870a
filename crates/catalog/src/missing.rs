//! Archives the mirror still lacks.

use crate::Database;
use crate::error::{ErrorKind, Result};
use arcadedb_hashdb::Snapshot;
use exn::ResultExt;
use serde::Serialize;
use std::path::Path;

/// One archive to download and upload to the mirror.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncItem {
    pub url: String,
    /// Destination path on the mirror (`<family>/<name>`).
    pub dlpath: String,
    pub size: u64,
}

/// Lists every catalog entry the mirror is missing or holds a different
/// version of, in catalog order.
///
/// `mirror` is keyed by mirror path. Entries whose path is in `skip_list` are
/// ignored. The database must have been built with the diff layout.
pub fn missing_archives(database: &Database, mirror: &Snapshot, skip_list: &[String]) -> Result<Vec<SyncItem>> {
    let mut missing = Vec::new();
    for (logical, entry) in &database.files {
        let Some(path) = entry.path.as_deref() else {
            exn::bail!(ErrorKind::NotDiffLayout(logical.clone()));
        };
        if skip_list.iter().any(|skipped| skipped == path) {
            continue;
        }
        let stale = match mirror.get(path) {
            Some(record) => record.md5 != entry.hash,
            None => true,
        };
        if stale {
            missing.push(SyncItem { url: entry.url.clone(), dlpath: path.to_string(), size: entry.size });
        }
    }
    tracing::info!(count = missing.len(), "Archives missing from mirror");
    Ok(missing)
}

/// Reads a skip list: a JSON array of mirror paths.
pub fn load_skip_list(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        exn::bail!(ErrorKind::MissingInput(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    serde_json::from_slice(&bytes).or_raise(|| ErrorKind::InvalidDatabase(path.to_path_buf()))
}
