use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::instrument;

/// Downloads URLs to local files.
pub trait Fetcher {
    /// Downloads `url` to `destination`, returning the number of bytes written.
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        (**self).fetch(url, destination)
    }
}

/// Fetches with the `curl` executable.
#[derive(Debug, Clone)]
pub struct Curl {
    binary: PathBuf,
    extra: Vec<String>,
}

impl Curl {
    /// Finds `curl` on `PATH`. `extra` arguments are appended to every
    /// invocation, ahead of the URL.
    pub fn discover(extra: Vec<String>) -> Result<Self> {
        match which::which("curl") {
            Ok(binary) => {
                tracing::trace!(curl = %binary.display(), "Discovered curl");
                Ok(Self { binary, extra })
            },
            Err(_) => exn::bail!(ErrorKind::ToolNotFound("curl")),
        }
    }

    fn command(&self, url: &str, destination: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(["-f", "-L", "-s", "-o"]).arg(destination).args(&self.extra).arg(url);
        command
    }
}

impl Fetcher for Curl {
    #[instrument(skip(self), fields(destination = %destination.display()))]
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        tracing::info!("Downloading");
        let status = self
            .command(url, destination)
            .stdin(Stdio::null())
            .status()
            .or_raise(|| ErrorKind::FetchFailed(url.to_string()))?;
        if !status.success() {
            tracing::error!(code = status.code(), "Download failed");
            exn::bail!(ErrorKind::FetchFailed(url.to_string()));
        }
        let size = std::fs::metadata(destination).or_raise(|| ErrorKind::Io(destination.to_path_buf()))?.len();
        tracing::debug!(size, "Downloaded");
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let curl = Curl { binary: PathBuf::from("curl"), extra: vec!["--cacert".to_string(), "ca.pem".to_string()] };
        let command = curl.command("https://example.com/db.zip", Path::new("/tmp/out.zip"));
        let args: Vec<_> = command.get_args().map(|arg| arg.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-f", "-L", "-s", "-o", "/tmp/out.zip", "--cacert", "ca.pem", "https://example.com/db.zip"]);
    }
}
