//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input file does not exist.
    #[display("missing required input: {}", _0.display())]
    MissingInput(#[error(not(source))] PathBuf),
    /// The source manifest exists but is not valid.
    #[display("invalid source manifest: {}", _0.display())]
    InvalidManifest(#[error(not(source))] PathBuf),
    /// A database document exists but is not valid.
    #[display("invalid database document: {}", _0.display())]
    InvalidDatabase(#[error(not(source))] PathBuf),
    /// A descriptor could not be read at all (as opposed to being malformed).
    #[display("unreadable descriptor: {}", _0.display())]
    Descriptor(#[error(not(source))] PathBuf),
    /// The descriptor directory could not be searched.
    #[display("descriptor discovery failed")]
    Discovery,
    /// A hash snapshot could not be loaded.
    #[display("hash snapshot could not be loaded")]
    Snapshot,
    /// The database was not built with the diff layout.
    #[display("entry {_0} has no mirror path; was the database built for mirror diffing?")]
    NotDiffLayout(#[error(not(source))] String),
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Descriptor(_))
    }
}
