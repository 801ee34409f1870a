//! Descriptor Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A descriptor error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for descriptor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is not well-formed XML. Skip the descriptor.
    #[display("malformed descriptor: {_0}")]
    Malformed(#[error(not(source))] String),
    /// The descriptor file could not be read.
    #[display("unreadable descriptor: {}", _0.display())]
    Unreadable(#[error(not(source))] PathBuf),
    /// The descriptor directory could not be walked.
    #[display("inaccessible descriptor directory: {}", _0.display())]
    Inaccessible(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The document is either well-formed or it isn't.
        false
    }
}
