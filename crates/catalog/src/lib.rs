//! Synthesis of the arcade ROM database.
//!
//! Descriptors say which archives each game needs; hash snapshots say what
//! those archives look like for each core release; the source manifest says
//! where each release is mirrored. [`Synthesis`] reconciles the three into a
//! [`Database`], allocating core tags in a [`TagDictionary`] as it goes.
//!
//! [`missing_archives`] compares a database built with [`Layout::Diff`]
//! against a mirror's own snapshot to find what the mirror still lacks.

pub mod error;
mod manifest;
mod missing;
mod models;
mod synth;
mod tags;

pub use crate::manifest::SourceManifest;
pub use crate::missing::{SyncItem, load_skip_list, missing_archives};
pub use crate::models::{CatalogEntry, DB_ID, Database, DefaultOptions, Folder, Layout, logical_path};
pub use crate::synth::{Summary, Synthesis};
pub use crate::tags::TagDictionary;
