//! Snapshot resolution.
//!
//! A requested version is turned into a loaded snapshot by walking an ordered
//! chain of [`Strategy`]s and stopping at the first one that yields a
//! document. Archive lookups get a second chance: when an archive is missing
//! from the snapshot resolved for its requested version, resolution runs again
//! without a requested version and the archive is looked up once more.

use crate::error::Result;
use crate::{Family, HashRecord, Snapshot, SnapshotSource};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// One way of choosing the version to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// The version the descriptor asked for, or the forced override.
    Declared,
    /// The family default.
    FamilyFallback,
}

impl Strategy {
    /// Tried in order; the first strategy producing a snapshot wins.
    pub const CHAIN: [Strategy; 2] = [Strategy::Declared, Strategy::FamilyFallback];

    fn version(self, requested: Option<&str>, family: Family) -> Option<&str> {
        match self {
            Strategy::Declared => requested,
            Strategy::FamilyFallback => Some(family.fallback_version()),
        }
    }
}

/// A snapshot chosen for a requested version.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub snapshot: Arc<Snapshot>,
    /// Version the snapshot was loaded for.
    pub version: String,
    pub strategy: Strategy,
}

/// An archive found in a resolved snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedArchive {
    /// Snapshot key that matched: the bare name or the family-qualified path.
    pub key: String,
    pub record: HashRecord,
    /// Effective version of the snapshot the archive was found in.
    pub version: String,
}

/// Resolves versions to snapshots, loading every document at most once.
///
/// The cache is keyed by document file name and remembers absences too, so a
/// missing document is never asked for twice.
pub struct Resolver<S> {
    source: S,
    forced: Option<String>,
    cache: HashMap<String, Option<Arc<Snapshot>>>,
}

impl<S: SnapshotSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source, forced: None, cache: HashMap::new() }
    }

    /// Substitutes `version` for every requested version, including absent
    /// ones. Blank values leave resolution untouched.
    #[must_use]
    pub fn with_forced_version(mut self, version: Option<&str>) -> Self {
        self.forced = version.map(str::trim).filter(|v| !v.is_empty()).map(ToString::to_string);
        self
    }

    pub fn forced_version(&self) -> Option<&str> {
        self.forced.as_deref()
    }

    /// The version resolution starts from once the override is applied.
    pub fn effective_request<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        self.forced.as_deref().or(requested)
    }

    /// Walks the strategy chain for `requested` within `family`.
    ///
    /// Returns `Ok(None)` when no strategy finds a snapshot.
    pub fn resolve(&mut self, requested: Option<&str>, family: Family) -> Result<Option<Resolution>> {
        let requested = self.effective_request(requested).map(ToString::to_string);
        for strategy in Strategy::CHAIN {
            let Some(version) = strategy.version(requested.as_deref(), family) else {
                continue;
            };
            let version = version.to_string();
            let Some(snapshot) = self.snapshot(family, &version)? else {
                continue;
            };
            if strategy == Strategy::FamilyFallback {
                tracing::warn!(
                    %family,
                    requested = requested.as_deref().unwrap_or("none"),
                    fallback = %version,
                    "Requested version has no snapshot, falling back"
                );
            }
            return Ok(Some(Resolution { snapshot, version, strategy }));
        }
        Ok(None)
    }

    /// Finds `archive` for a descriptor requesting `requested`.
    ///
    /// When the archive is absent from the snapshot resolved for the requested
    /// version, resolution is retried without a requested version and the
    /// archive is probed again.
    #[instrument(skip(self))]
    pub fn resolve_archive(
        &mut self,
        requested: Option<&str>,
        family: Family,
        archive: &str,
    ) -> Result<Option<ResolvedArchive>> {
        let Some(first) = self.resolve(requested, family)? else {
            return Ok(None);
        };
        if let Some(found) = Self::probe(&first, family, archive) {
            return Ok(Some(found));
        }
        let Some(retry) = self.resolve(None, family)? else {
            return Ok(None);
        };
        tracing::info!(from = %first.version, to = %retry.version, "Archive not in snapshot, retrying with fallback");
        Ok(Self::probe(&retry, family, archive))
    }

    fn probe(resolution: &Resolution, family: Family, archive: &str) -> Option<ResolvedArchive> {
        let (key, record) = resolution.snapshot.find(family, archive)?;
        Some(ResolvedArchive { key, record: record.clone(), version: resolution.version.clone() })
    }

    /// The family-specific document for `version`, else the generic one.
    fn snapshot(&mut self, family: Family, version: &str) -> Result<Option<Arc<Snapshot>>> {
        if let Some(snapshot) = self.cached(&family.snapshot_name(version))? {
            return Ok(Some(snapshot));
        }
        self.cached(&format!("{version}.json"))
    }

    fn cached(&mut self, file_name: &str) -> Result<Option<Arc<Snapshot>>> {
        if let Some(entry) = self.cache.get(file_name) {
            return Ok(entry.clone());
        }
        tracing::debug!(file_name, "Loading snapshot");
        let loaded = self.source.load(file_name)?.map(Arc::new);
        self.cache.insert(file_name.to_string(), loaded.clone());
        Ok(loaded)
    }
}
