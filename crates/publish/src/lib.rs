//! Moving the database in and out of the outside world.
//!
//! External tools are reached through two small collaborator traits so the
//! publishing logic can be exercised without a network or a repository:
//!
//! - [`Fetcher`] downloads a URL to a file ([`Curl`] in production)
//! - [`Git`] runs git subcommands in the working copy ([`GitCli`])
//!
//! On top of those, [`download_packs`] unpacks descriptor packs,
//! [`Artifact`] persists a database as pretty JSON plus a single-entry ZIP,
//! and [`Publisher`] republishes only when the content actually changed.

mod artifact;
mod descriptors;
pub mod diff;
pub mod error;
mod fetch;
mod git;
mod publisher;
#[cfg(test)]
mod testing;

pub use crate::artifact::Artifact;
pub use crate::descriptors::download_packs;
pub use crate::fetch::{Curl, Fetcher};
pub use crate::git::{Git, GitCli};
pub use crate::publisher::{Outcome, Publisher};
