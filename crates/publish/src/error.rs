//! Publish Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A publishing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for publishing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required executable is not on `PATH`.
    #[display("{_0} not found on PATH")]
    ToolNotFound(#[error(not(source))] &'static str),
    /// An external command ran but exited unsuccessfully.
    #[display("command failed: {_0}")]
    CommandFailed(#[error(not(source))] String),
    /// A URL could not be downloaded.
    #[display("could not fetch {_0}")]
    FetchFailed(#[error(not(source))] String),
    /// A descriptor pack could not be downloaded or unpacked.
    #[display("descriptor pack unusable: {_0}")]
    DescriptorPack(#[error(not(source))] String),
    /// The published artifact could not be read.
    #[display("invalid artifact: {}", _0.display())]
    InvalidArtifact(#[error(not(source))] PathBuf),
    /// A document could not be serialized.
    #[display("serialization failed")]
    Serialize,
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed(_) | Self::DescriptorPack(_))
    }
}
