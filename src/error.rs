//! Centralized error types for mboxfrom.
//!
//! Recognizing a separator line never fails; these errors come from the
//! layers around it (reading mailboxes and loading configuration).

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxfrom library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// The configuration file could not be parsed.
    #[error("Invalid configuration in '{path}': {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}

/// Convenience alias for `Result<T, ScanError>`.
pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (reading stdin, for instance).
impl From<std::io::Error> for ScanError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<stdin>"),
            source,
        }
    }
}
