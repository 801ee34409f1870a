//! Database synthesis.
//!
//! Descriptors are visited in processing order and every archive they require
//! is resolved against the hash snapshots. The first descriptor to produce a
//! logical path owns it; later producers are skipped, with a warning when they
//! ask for a different version.

use crate::error::{ErrorKind, Result};
use crate::models::{Located, logical_path};
use crate::{CatalogEntry, Database, Layout, SourceManifest, TagDictionary};
use arcadedb_hashdb::{Family, Resolver, SnapshotSource};
use arcadedb_mra::ArcadeDescriptor;
use arcadedb_mra::error::ErrorKind as MraErrorKind;
use exn::ResultExt;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Placeholder archive some descriptors list that never exists on a mirror.
const PLACEHOLDER_ARCHIVE: &str = "jtbeta.zip";

/// Counters for one synthesis run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub descriptors: usize,
    pub malformed: usize,
    pub added: usize,
    pub unresolved: usize,
    pub conflicts: usize,
}

/// Assembles catalog entries from descriptors.
///
/// The resolver (with its snapshot cache) and the tag dictionary are owned by
/// the caller for the whole run and borrowed here.
pub struct Synthesis<'a, S> {
    resolver: &'a mut Resolver<S>,
    tags: &'a mut TagDictionary,
    manifest: &'a SourceManifest,
    layout: Layout,
    files: BTreeMap<String, CatalogEntry>,
    /// Effective version each logical path was produced from.
    versions: HashMap<String, String>,
    summary: Summary,
}

impl<'a, S: SnapshotSource> Synthesis<'a, S> {
    pub fn new(
        resolver: &'a mut Resolver<S>,
        tags: &'a mut TagDictionary,
        manifest: &'a SourceManifest,
        layout: Layout,
    ) -> Self {
        Self {
            resolver,
            tags,
            manifest,
            layout,
            files: BTreeMap::new(),
            versions: HashMap::new(),
            summary: Summary::default(),
        }
    }

    /// Reads and adds every descriptor, in processing order.
    ///
    /// Malformed descriptors are logged and skipped; unreadable ones are fatal.
    pub fn add_all(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        for path in arcadedb_mra::processing_order(paths) {
            let descriptor = match arcadedb_mra::read(&path) {
                Ok(descriptor) => descriptor,
                Err(e) if matches!(e.deref(), MraErrorKind::Malformed(_)) => {
                    tracing::error!(descriptor = %path.display(), error = %e, "Malformed descriptor, skipping");
                    self.summary.descriptors += 1;
                    self.summary.malformed += 1;
                    continue;
                },
                Err(e) => return Err(e).or_raise(|| ErrorKind::Descriptor(path.clone())),
            };
            self.add(&path, &descriptor)?;
        }
        Ok(())
    }

    /// Adds the archives one descriptor requires.
    #[instrument(skip_all, fields(descriptor = %origin.display()))]
    pub fn add(&mut self, origin: &Path, descriptor: &ArcadeDescriptor) -> Result<()> {
        tracing::info!("Reading descriptor");
        self.summary.descriptors += 1;
        for archive in descriptor.archive_names() {
            if archive == PLACEHOLDER_ARCHIVE {
                continue;
            }
            self.add_archive(descriptor, archive)?;
        }
        Ok(())
    }

    fn add_archive(&mut self, descriptor: &ArcadeDescriptor, archive: &str) -> Result<()> {
        let family = Family::of_archive(archive);
        let name = archive.rsplit('/').next().unwrap_or(archive);
        let path = logical_path(family, name);
        let requested = self.resolver.effective_request(descriptor.core_version.as_deref()).map(ToString::to_string);

        if let Some(existing) = self.versions.get(&path) {
            if requested.as_deref() != Some(existing.as_str()) {
                tracing::warn!(
                    %path,
                    existing = %existing,
                    requested = requested.as_deref().unwrap_or("none"),
                    "Archive redefined with a different version, keeping first"
                );
                self.summary.conflicts += 1;
            }
            return Ok(());
        }

        let found = self
            .resolver
            .resolve_archive(descriptor.core_version.as_deref(), family, name)
            .or_raise(|| ErrorKind::Snapshot)?;
        let Some(found) = found else {
            tracing::warn!(archive = name, %family, "Archive not in any snapshot, skipping");
            self.summary.unresolved += 1;
            return Ok(());
        };
        let Some(base) = self.manifest.base_url(family, &found.version) else {
            tracing::warn!(archive = name, %family, version = %found.version, "No mirror for version, skipping");
            self.summary.unresolved += 1;
            return Ok(());
        };

        let url = format!("{base}{}", found.record.fullpath.as_deref().unwrap_or(&found.key));
        let core_tag = descriptor.core_id.as_deref().map(|id| self.tags.tag_for(id));
        let located = Located {
            family,
            name,
            md5: &found.record.md5,
            size: found.record.size,
            url,
            version: &found.version,
        };
        tracing::info!(archive = name, version = %found.version, "Added archive");
        self.files.insert(path.clone(), CatalogEntry::new(self.layout, located, core_tag));
        self.versions.insert(path, found.version);
        self.summary.added += 1;
        Ok(())
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// The assembled document, stamped with `timestamp`.
    pub fn finish(self, timestamp: i64) -> Database {
        Database::new(self.files, self.tags.clone(), timestamp)
    }
}
