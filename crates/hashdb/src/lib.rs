//! Versioned hash snapshots and how archives are resolved against them.
//!
//! A snapshot is a JSON document listing the verified checksum and size of
//! every archive for one (family, version) pair. This crate provides:
//!
//! - **Snapshot documents** via [`Snapshot`] and [`HashRecord`]
//! - **Snapshot storage** behind the [`SnapshotSource`] trait, with
//!   [`DirectorySource`] reading documents from a directory
//! - **Resolution** via [`Resolver`], which walks the [`Strategy`] chain,
//!   caches every document it loads, and retries archive lookups against the
//!   family fallback
//! - **Snapshot building** from mirror metadata listings via
//!   [`merge_metadata`]
//!
//! # Example
//!
//! ```
//! use arcadedb_hashdb::{DirectorySource, Family, Resolver};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("mamemerged0220.json"),
//!     r#"{"foo.zip": {"md5": "abc123", "size": 1024}}"#,
//! ).unwrap();
//!
//! let mut resolver = Resolver::new(DirectorySource::new(dir.path()));
//! let found = resolver.resolve_archive(Some("0220"), Family::Mame, "foo.zip").unwrap().unwrap();
//! assert_eq!((found.record.md5.as_str(), found.version.as_str()), ("abc123", "0220"));
//! ```

pub mod error;
mod family;
mod metadata;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod resolve;
mod snapshot;
mod source;

pub use crate::family::Family;
pub use crate::metadata::{ArchiveMetadata, MetadataFile, MetadataSize, MirrorSource, merge_metadata};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MemorySource;
pub use crate::resolve::{Resolution, ResolvedArchive, Resolver, Strategy};
pub use crate::snapshot::{HashRecord, SKIP_LIST_KEY, Snapshot};
pub use crate::source::{DirectorySource, SnapshotSource};
