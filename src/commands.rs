use crate::error::{ErrorKind, Result};
use arcadedb_catalog::{Database, Layout, SourceManifest, Synthesis, TagDictionary};
use arcadedb_config::Config;
use arcadedb_hashdb::{ArchiveMetadata, DirectorySource, MirrorSource, Resolver, Snapshot};
use arcadedb_publish::diff::to_pretty_json;
use arcadedb_publish::{Artifact, Curl, Fetcher, GitCli, Outcome, Publisher};
use exn::{OptionExt, ResultExt};
use std::path::Path;
use time::UtcDateTime;
use tracing::instrument;

/// Downloads descriptors, synthesizes the database, then saves and publishes
/// it as configured.
#[instrument(skip_all)]
pub fn build(config: &Config, offline: bool) -> Result<()> {
    let manifest = SourceManifest::load(&config.sources).or_raise(|| ErrorKind::Input)?;
    if offline {
        tracing::info!(directory = %config.descriptors.display(), "Offline; using descriptors already on disk");
    } else {
        let curl = Curl::discover(config.curl_args()).or_raise(|| ErrorKind::Tool)?;
        arcadedb_publish::download_packs(&curl, manifest.packs(), &config.descriptors)
            .or_raise(|| ErrorKind::Download)?;
    }
    let descriptors = arcadedb_mra::find_all(&config.descriptors).or_raise(|| ErrorKind::Input)?;

    let mut resolver =
        Resolver::new(DirectorySource::new(&config.snapshots)).with_forced_version(config.forced_version());
    let mut tags = TagDictionary::default();
    let layout = Layout::for_mirror_diff(config.build_for_iadiff);
    let mut synthesis = Synthesis::new(&mut resolver, &mut tags, &manifest, layout);
    synthesis.add_all(descriptors).or_raise(|| ErrorKind::Synthesis)?;
    let summary = synthesis.summary();
    let database = synthesis.finish(UtcDateTime::now().unix_timestamp());
    tracing::info!(
        descriptors = summary.descriptors,
        malformed = summary.malformed,
        files = summary.added,
        unresolved = summary.unresolved,
        conflicts = summary.conflicts,
        tags = database.tag_dictionary.len(),
        "Database synthesized"
    );

    if let Some(path) = &config.local_save_file {
        Artifact::from_json(path).save(&database).or_raise(|| ErrorKind::Save)?;
    }
    if let Some(branch) = &config.git_push_branch {
        publish(config, branch, &database)?;
    }
    tracing::info!("Done");
    Ok(())
}

fn publish(config: &Config, branch: &str, database: &Database) -> Result<()> {
    let git = GitCli::discover(".").or_raise(|| ErrorKind::Tool)?;
    let curl = Curl::discover(config.curl_args()).or_raise(|| ErrorKind::Tool)?;
    let publisher = Publisher::new(git, curl, Artifact::from_zip(&config.artifact), branch, config.db_url.as_str());
    match publisher.publish(database).or_raise(|| ErrorKind::Publish)? {
        Outcome::Unchanged => tracing::info!(branch, "Published database already up to date"),
        Outcome::Published => tracing::info!(branch, "Published new database"),
    }
    Ok(())
}

/// Builds or extends the snapshot at `output` from a mirror's metadata listing.
#[instrument(skip(config), fields(output = %output.display()))]
pub fn snapshot(config: &Config, source: &str, output: &Path, metadata: Option<&Path>) -> Result<()> {
    let source = MirrorSource::parse(source).or_raise(|| ErrorKind::Input)?;
    let listing = match metadata {
        Some(path) => ArchiveMetadata::load(path).or_raise(|| ErrorKind::Input)?,
        None => {
            let curl = Curl::discover(config.curl_args()).or_raise(|| ErrorKind::Tool)?;
            let download = tempfile::NamedTempFile::new().or_raise(|| ErrorKind::Snapshot)?;
            curl.fetch(&source.metadata_url(), download.path()).or_raise(|| ErrorKind::Download)?;
            ArchiveMetadata::load(download.path()).or_raise(|| ErrorKind::Input)?
        },
    };
    let mut snapshot = Snapshot::load(output).or_raise(|| ErrorKind::Input)?.unwrap_or_default();
    let merged = arcadedb_hashdb::merge_metadata(&mut snapshot, &listing, source.subdir());
    snapshot.save(output).or_raise(|| ErrorKind::Snapshot)?;
    tracing::info!(item = source.item(), merged, total = snapshot.len(), "Snapshot saved");
    Ok(())
}

/// Prints the archives the mirror is missing as a JSON array.
pub fn missing(catalog: &Path, mirror: &Path, skip_list: Option<&Path>) -> Result<()> {
    let database = Database::load(catalog).or_raise(|| ErrorKind::Input)?;
    let mirror = Snapshot::load(mirror).or_raise(|| ErrorKind::Input)?.ok_or_raise(|| ErrorKind::Input)?;
    let skip_list = match skip_list {
        Some(path) => arcadedb_catalog::load_skip_list(path).or_raise(|| ErrorKind::Input)?,
        None => Vec::new(),
    };
    let items = arcadedb_catalog::missing_archives(&database, &mirror, &skip_list).or_raise(|| ErrorKind::Report)?;
    println!("{}", to_pretty_json(&items).or_raise(|| ErrorKind::Report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ops::Deref;

    const LISTING: &str = r#"{"files": [
        {"name": "roms/foo.zip", "format": "ZIP", "md5": "abc", "size": "10"},
        {"name": "roms/bar.zip", "format": "ZIP", "md5": "def", "size": "20"},
        {"name": "roms/foo.xml", "format": "Metadata", "md5": "ghi", "size": "1"}
    ]}"#;

    #[test]
    fn test_snapshot_from_local_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = dir.path().join("metadata.json");
        let output = dir.path().join("mamemerged0245.json");
        std::fs::write(&metadata, LISTING).unwrap();

        snapshot(&Config::default(), "mame-merged/roms", &output, Some(&metadata)).unwrap();
        let saved = Snapshot::load(&output).unwrap().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.get("foo.zip").unwrap().fullpath.as_deref(), Some("roms/foo.zip"));

        // Running again extends rather than replaces.
        std::fs::write(&metadata, r#"{"files": [{"name": "roms/baz.zip", "format": "ZIP", "md5": "x", "size": 3}]}"#)
            .unwrap();
        snapshot(&Config::default(), "mame-merged/roms", &output, Some(&metadata)).unwrap();
        assert_eq!(Snapshot::load(&output).unwrap().unwrap().len(), 3);
    }

    #[test]
    fn test_snapshot_rejects_bad_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = snapshot(&Config::default(), "not a source", &dir.path().join("out.json"), None).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Input));
    }

    #[test]
    fn test_missing_requires_mirror_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("db.json");
        std::fs::write(
            &catalog,
            r#"{"db_id": "arcade_roms_db", "files": {}, "folders": {}, "tag_dictionary": {}, "timestamp": 0,
                "default_options": {"downloader_retries": 6, "downloader_timeout": 900}}"#,
        )
        .unwrap();
        let err = missing(&catalog, &dir.path().join("absent.json"), None).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Input));
    }

    #[test]
    fn test_build_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { sources: dir.path().join("arcade_sources.json"), ..Config::default() };
        let err = build(&config, true).unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Input));
    }
}
