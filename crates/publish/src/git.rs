use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Runs git subcommands against one working copy.
pub trait Git {
    /// Runs `git <args>`; a non-zero exit status is an error.
    fn run(&self, args: &[&str]) -> Result<()>;
}

impl<G: Git + ?Sized> Git for &G {
    fn run(&self, args: &[&str]) -> Result<()> {
        (**self).run(args)
    }
}

/// The `git` executable, run in a fixed working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
    workdir: PathBuf,
}

impl GitCli {
    pub fn discover(workdir: impl Into<PathBuf>) -> Result<Self> {
        match which::which("git") {
            Ok(binary) => Ok(Self { binary, workdir: workdir.into() }),
            Err(_) => exn::bail!(ErrorKind::ToolNotFound("git")),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl Git for GitCli {
    fn run(&self, args: &[&str]) -> Result<()> {
        let line = format!("git {}", args.join(" "));
        tracing::info!(command = %line, "Running command");
        let status = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .status()
            .or_raise(|| ErrorKind::CommandFailed(line.clone()))?;
        if !status.success() {
            tracing::error!(command = %line, code = status.code(), "Command failed");
            exn::bail!(ErrorKind::CommandFailed(line));
        }
        Ok(())
    }
}
