//! Hash Database Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A hash database error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for hash database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A snapshot document exists but does not follow the snapshot schema.
    #[display("invalid snapshot: {_0}")]
    InvalidSnapshot(#[error(not(source))] String),
    /// Reading or writing a snapshot document failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The mirror source is not of the form `<item>[/<subdir>]`.
    #[display("unsupported mirror source: {_0}")]
    InvalidSource(#[error(not(source))] String),
    /// The mirror metadata listing could not be parsed.
    #[display("invalid mirror metadata")]
    InvalidMetadata,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
