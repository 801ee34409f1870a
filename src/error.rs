//! Application Error Types
//!
//! Every command failure is reported as one of these categories, with the
//! library error that caused it attached beneath.

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be loaded; fix the config files or environment.
    #[display("invalid configuration")]
    Config,
    /// A required tool is missing; install it.
    #[display("required tool unavailable")]
    Tool,
    /// Descriptor packs could not be downloaded or unpacked.
    #[display("descriptor download failed")]
    Download,
    /// A required input file or directory is missing or invalid.
    #[display("required input unavailable")]
    Input,
    /// Database synthesis hit an unrecoverable condition.
    #[display("database synthesis failed")]
    Synthesis,
    /// The database could not be written locally.
    #[display("saving the database failed")]
    Save,
    /// The diff-gated publish sequence failed part way.
    #[display("publishing failed")]
    Publish,
    /// A snapshot could not be built or saved.
    #[display("snapshot building failed")]
    Snapshot,
    /// The missing-archive report could not be produced.
    #[display("missing-archive report failed")]
    Report,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Download | Self::Publish)
    }
}
