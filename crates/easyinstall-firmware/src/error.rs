//! Error types for firmware management

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for firmware operations
pub type Result<T> = std::result::Result<T, FirmwareError>;

/// Errors raised while syncing, downloading or locating firmware
#[derive(Debug, Error)]
pub enum FirmwareError {
    /// Failed to write a downloaded file
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed {
        /// Destination file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Failed to create a directory
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed {
        /// Directory
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Failed to delete a file or directory during an update
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        /// File or directory
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A directory the update expects to delete is not there
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Invalid glob pattern
    #[error("invalid pattern {pattern}: {source}")]
    Pattern {
        /// The pattern as given
        pattern: String,
        /// Parser error
        source: glob::PatternError,
    },

    /// Release metadata could not be decoded
    #[error("invalid release metadata from {url}: {source}")]
    ReleaseMetadata {
        /// Metadata URL
        url: String,
        /// JSON error
        source: serde_json::Error,
    },

    /// Git operation failed
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// HTTP download failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Failure of the repository sync capability
#[derive(Debug, Error)]
pub enum SyncError {
    /// The git program could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Git ran and reported an error
    #[error("git {command} failed: {stderr}")]
    Failed {
        /// Git subcommand
        command: String,
        /// Trimmed standard error output
        stderr: String,
    },
}

/// Failure of the asset fetch capability
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL
        url: String,
        /// Transport error
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code
        status: u16,
    },
}
