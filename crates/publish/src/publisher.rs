//! Diff-gated publishing.
//!
//! The synthesized database is compared with the currently published one,
//! ignoring timestamps. Only a real content change is committed, as the single
//! commit of an orphan branch that is force-pushed over the previous one.

use crate::diff::{normalized, to_pretty_json, unified_diff};
use crate::error::{ErrorKind, Result};
use crate::{Artifact, Fetcher, Git};
use exn::ResultExt;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

const COMMIT_MESSAGE: &str = "-";
const REMOTE: &str = "origin";

/// What a publish attempt did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The published database already had this content.
    Unchanged,
    /// A new commit was pushed.
    Published,
}

pub struct Publisher<G, F> {
    git: G,
    fetcher: F,
    artifact: Artifact,
    branch: String,
    db_url: String,
}

impl<G: Git, F: Fetcher> Publisher<G, F> {
    /// `db_url` is where the currently published artifact is served from.
    pub fn new(git: G, fetcher: F, artifact: Artifact, branch: impl Into<String>, db_url: impl Into<String>) -> Self {
        Self { git, fetcher, artifact, branch: branch.into(), db_url: db_url.into() }
    }

    #[instrument(skip_all, fields(branch = %self.branch))]
    pub fn publish<T: Serialize>(&self, database: &T) -> Result<Outcome> {
        self.git.run(&["fetch", REMOTE])?;
        let published = to_pretty_json(&normalized(self.published()?))?;
        let synthesized = serde_json::to_value(database).or_raise(|| ErrorKind::Serialize)?;
        let synthesized = to_pretty_json(&normalized(synthesized))?;

        if published == synthesized {
            tracing::info!("No changes detected");
            return Ok(Outcome::Unchanged);
        }
        tracing::info!("Found differences");
        for line in unified_diff(&published, &synthesized).lines() {
            tracing::info!("{line}");
        }

        let json = self.artifact.json_path().to_string_lossy().into_owned();
        let zip = self.artifact.zip_path().to_string_lossy().into_owned();
        self.git.run(&["checkout", "--orphan", self.branch.as_str()])?;
        self.git.run(&["reset"])?;
        self.artifact.save(database)?;
        self.git.run(&["add", json.as_str(), zip.as_str()])?;
        self.git.run(&["commit", "-m", COMMIT_MESSAGE])?;
        self.git.run(&["push", "--force", REMOTE, self.branch.as_str()])?;
        tracing::info!("Published");
        Ok(Outcome::Published)
    }

    /// The published document, or an empty object when none can be fetched.
    fn published(&self) -> Result<Value> {
        let empty = Value::Object(serde_json::Map::new());
        if self.db_url.is_empty() {
            tracing::warn!("No published database URL configured; comparing against an empty document");
            return Ok(empty);
        }
        let download = tempfile::NamedTempFile::new().or_raise(|| ErrorKind::Io(std::env::temp_dir()))?;
        if let Err(e) = self.fetcher.fetch(&self.db_url, download.path()) {
            tracing::warn!(
                url = %self.db_url,
                error = %e,
                "Published database unavailable; comparing against an empty document"
            );
            return Ok(empty);
        }
        self.artifact.read_zipped(download.path())
    }
}
