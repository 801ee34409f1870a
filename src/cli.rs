use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Builds and publishes the arcade ROM archive database.
#[derive(Parser, Debug)]
#[command(name = "arcadedb", version, about)]
pub struct Cli {
    /// Extra configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More logging; repeat for even more
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download descriptors, synthesize the database, then save and publish it
    /// as configured (the default)
    Build {
        /// Use the descriptors already on disk instead of downloading packs
        #[arg(long)]
        offline: bool,
    },
    /// Build or extend a hash snapshot from an archive mirror's metadata listing
    Snapshot {
        /// Mirror item, optionally with a directory: `<item>[/<subdir>]`
        source: String,
        /// Snapshot document to create or extend
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
        /// Read the metadata listing from this file instead of downloading it
        #[arg(long, value_name = "FILE")]
        metadata: Option<PathBuf>,
    },
    /// Print the archives a mirror is missing, as JSON
    Missing {
        /// Database built for mirror diffing
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,
        /// The mirror's own snapshot, keyed by `<family>/<name>`
        #[arg(long, value_name = "FILE")]
        mirror: PathBuf,
        /// JSON array of mirror paths to leave out
        #[arg(long, value_name = "FILE")]
        skip_list: Option<PathBuf>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Build { offline: false })
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["arcadedb"], Command::Build { offline: false })]
    #[case(&["arcadedb", "build", "--offline"], Command::Build { offline: true })]
    #[case(
        &["arcadedb", "snapshot", "mame-merged/roms", "-o", "mamemerged0245.json"],
        Command::Snapshot {
            source: "mame-merged/roms".to_string(),
            output: PathBuf::from("mamemerged0245.json"),
            metadata: None,
        }
    )]
    #[case(
        &["arcadedb", "missing", "--catalog", "db.json", "--mirror", "ia.json", "--skip-list", "skip.json"],
        Command::Missing {
            catalog: PathBuf::from("db.json"),
            mirror: PathBuf::from("ia.json"),
            skip_list: Some(PathBuf::from("skip.json")),
        }
    )]
    fn test_commands(#[case] args: &[&str], #[case] expected: Command) {
        assert_eq!(Cli::try_parse_from(args).unwrap().command(), expected);
    }

    #[rstest]
    #[case(&["arcadedb"], "info")]
    #[case(&["arcadedb", "-v"], "debug")]
    #[case(&["arcadedb", "build", "-vvv"], "trace")]
    fn test_verbosity(#[case] args: &[&str], #[case] filter: &str) {
        assert_eq!(Cli::try_parse_from(args).unwrap().default_filter(), filter);
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["arcadedb", "missing", "--catalog", "a", "--mirror", "b", "--config", "c.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn test_snapshot_requires_output() {
        assert!(Cli::try_parse_from(["arcadedb", "snapshot", "item"]).is_err());
    }
}
