//! ZIP handling for published artifacts and descriptor packs.
//!
//! The published database travels as a ZIP archive holding exactly one JSON
//! entry, and descriptor packs arrive as ZIP archives from which only a subset
//! of entries is wanted. This crate provides:
//!
//! - **Artifact building** via [`zip_single`] (one deflated entry, best level)
//! - **Artifact reading** via [`read_entry`]
//! - **Selective extraction** via [`extract_matching`], matching entry names
//!   exactly or by glob
//!
//! Everything is synchronous; archives handled here are small enough to hold
//! in memory.

pub mod error;
mod ops;

pub use crate::ops::{extract_matching, read_entry, zip_single};
