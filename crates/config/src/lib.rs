//! Layered configuration for the database builder.
//!
//! Sources are merged with [`figment`], lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. `config.toml` in the user configuration directory
//! 3. `arcadedb.toml` in the working directory
//! 4. An explicit file passed on the command line (TOML, YAML or JSON)
//! 5. `ARCADEDB_*` environment variables
//! 6. The unprefixed variables the publishing workflow has always exported
//!    (`FORCE_MAMESOURCE`, `BUILD_FOR_IADIFF`, `LOCAL_SAVE_FILE`,
//!    `GIT_PUSH_BRANCH`, `DB_URL`, `CURL_SECURE`)
//!
//! Missing implicit files are ignored; a missing explicit file is an error.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const LOCAL_CONFIG_FILE: &str = "arcadedb.toml";
const ENV_PREFIX: &str = "ARCADEDB_";

/// Resolved builder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source manifest (descriptor packs and per-family mirror base URLs).
    pub sources: PathBuf,
    /// Directory descriptors are downloaded into and scanned from.
    pub descriptors: PathBuf,
    /// Directory holding the hash snapshot documents.
    pub snapshots: PathBuf,
    /// File name of the published artifact; the JSON entry inside it is named
    /// after its stem.
    pub artifact: String,
    /// Forces every resolution to this version when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_mamesource: Option<String>,
    /// Emit the extended entry shape consumed by mirror diffing.
    pub build_for_iadiff: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_save_file: Option<PathBuf>,
    /// Publishing only happens when a branch is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_push_branch: Option<String>,
    /// Where the currently published artifact can be downloaded from.
    pub db_url: String,
    /// Extra whitespace-separated arguments passed to every curl invocation.
    pub curl_secure: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: PathBuf::from("arcade_sources.json"),
            descriptors: PathBuf::from("delme"),
            snapshots: PathBuf::from("."),
            artifact: "arcade_roms_db.json.zip".to_string(),
            force_mamesource: None,
            build_for_iadiff: false,
            local_save_file: None,
            git_push_branch: None,
            db_url: String::new(),
            curl_secure: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from every layer, optionally including an explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let figment = layered(explicit)?.merge(Serialized::defaults(LegacyEnv::from_lookup(|key| {
            std::env::var(key).ok()
        })));
        Self::from_figment(&figment)
    }

    /// Extract and validate configuration from an already-built figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        match figment.extract::<Self>() {
            Ok(config) => Ok(config),
            Err(e) => exn::bail!(ErrorKind::Invalid(e.to_string())),
        }
    }

    /// The forced version override; an empty value counts as unset.
    pub fn forced_version(&self) -> Option<&str> {
        self.force_mamesource.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Extra curl arguments split on whitespace.
    pub fn curl_args(&self) -> Vec<String> {
        self.curl_secure.split_whitespace().map(ToString::to_string).collect()
    }
}

/// Every file and prefixed-environment layer, without the legacy variables.
fn layered(explicit: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(dirs) = ProjectDirs::from("", "", "arcadedb") {
        let user = dirs.config_dir().join("config.toml");
        tracing::trace!(path = %user.display(), "Checking user configuration file");
        figment = figment.merge(Toml::file(user));
    }
    figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));
    if let Some(path) = explicit {
        figment = merge_explicit(figment, path)?;
    }
    // Versions such as `0220` must stay strings; figment would parse them as numbers.
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["force_mamesource"])))
}

fn merge_explicit(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

/// The unprefixed environment variables, read verbatim.
///
/// Values are taken as raw strings rather than going through figment's
/// environment provider so that versions keep their leading zeros.
/// `BUILD_FOR_IADIFF` is enabled by any non-empty value.
#[derive(Debug, Default, Serialize)]
struct LegacyEnv {
    #[serde(skip_serializing_if = "Option::is_none")]
    force_mamesource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_for_iadiff: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_save_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_push_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    curl_secure: Option<String>,
}

impl LegacyEnv {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            force_mamesource: lookup("FORCE_MAMESOURCE"),
            build_for_iadiff: lookup("BUILD_FOR_IADIFF").map(|v| !v.is_empty()),
            local_save_file: lookup("LOCAL_SAVE_FILE").map(PathBuf::from),
            git_push_branch: lookup("GIT_PUSH_BRANCH"),
            db_url: lookup("DB_URL"),
            curl_secure: lookup("CURL_SECURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;
    use std::io::Write;

    fn with_legacy(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::defaults(LegacyEnv::from_lookup(|key| vars.get(key).cloned())));
        Config::from_figment(&figment).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = with_legacy(&[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.forced_version(), None);
        assert!(config.curl_args().is_empty());
    }

    #[test]
    fn test_legacy_variables_keep_leading_zeros() {
        let config = with_legacy(&[("FORCE_MAMESOURCE", "0220"), ("GIT_PUSH_BRANCH", "db")]);
        assert_eq!(config.forced_version(), Some("0220"));
        assert_eq!(config.git_push_branch.as_deref(), Some("db"));
    }

    #[rstest]
    #[case("", false)]
    #[case("1", true)]
    #[case("true", true)]
    #[case("no", true)]
    fn test_iadiff_flag_is_any_non_empty_value(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(with_legacy(&[("BUILD_FOR_IADIFF", value)]).build_for_iadiff, expected);
    }

    #[test]
    fn test_empty_forced_version_is_unset() {
        let config = with_legacy(&[("FORCE_MAMESOURCE", "  ")]);
        assert_eq!(config.forced_version(), None);
    }

    #[test]
    fn test_curl_args_split_on_whitespace() {
        let config = with_legacy(&[("CURL_SECURE", " --cacert  ca.pem ")]);
        assert_eq!(config.curl_args(), vec!["--cacert".to_string(), "ca.pem".to_string()]);
    }

    #[rstest]
    #[case("toml", "snapshots = \"hashes\"\nbuild_for_iadiff = true\n")]
    #[case("yaml", "snapshots: hashes\nbuild_for_iadiff: true\n")]
    #[case("json", r#"{"snapshots": "hashes", "build_for_iadiff": true}"#)]
    fn test_explicit_file(#[case] extension: &str, #[case] contents: &str) {
        let mut file = tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let figment = merge_explicit(Figment::from(Serialized::defaults(Config::default())), file.path()).unwrap();
        let config = Config::from_figment(&figment).unwrap();
        assert_eq!(config.snapshots, PathBuf::from("hashes"));
        assert!(config.build_for_iadiff);
        assert_eq!(config.artifact, "arcade_roms_db.json.zip");
    }

    #[test]
    fn test_explicit_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = merge_explicit(Figment::new(), &path).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }

    #[test]
    fn test_explicit_file_unsupported() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = merge_explicit(Figment::new(), file.path()).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat(file.path().to_path_buf()));
    }

    #[test]
    fn test_invalid_type() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::default("build_for_iadiff", "definitely"));
        let err = Config::from_figment(&figment).unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }
}
