//! Recording fakes of the external collaborators.

use crate::error::{ErrorKind, Result};
use crate::{Fetcher, Git};
use exn::ResultExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// Records every git invocation; fails the first one starting with `fail_on`.
#[derive(Default)]
pub(crate) struct RecordingGit {
    pub calls: RefCell<Vec<String>>,
    pub fail_on: Option<&'static str>,
}

impl Git for RecordingGit {
    fn run(&self, args: &[&str]) -> Result<()> {
        let line = args.join(" ");
        self.calls.borrow_mut().push(line.clone());
        if self.fail_on.is_some_and(|prefix| line.starts_with(prefix)) {
            exn::bail!(ErrorKind::CommandFailed(line));
        }
        Ok(())
    }
}

/// Serves fixed bodies by URL; anything else fails like `curl -f` on a 404.
#[derive(Default)]
pub(crate) struct StaticFetcher {
    pub bodies: HashMap<String, Vec<u8>>,
    pub requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn with(bodies: impl IntoIterator<Item = (impl Into<String>, Vec<u8>)>) -> Self {
        Self { bodies: bodies.into_iter().map(|(url, body)| (url.into(), body)).collect(), ..Self::default() }
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        self.requests.borrow_mut().push(url.to_string());
        let Some(body) = self.bodies.get(url) else {
            exn::bail!(ErrorKind::FetchFailed(url.to_string()));
        };
        std::fs::write(destination, body).or_raise(|| ErrorKind::Io(destination.to_path_buf()))?;
        Ok(body.len() as u64)
    }
}
