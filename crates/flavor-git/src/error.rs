//! Error types for flavor-git

use std::path::PathBuf;

/// Result type for flavor-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flavor-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] flavor_fs::Error),

    #[error("Failed to clone {location}: {message}")]
    CloneFailed { location: String, message: String },

    #[error("Failed to fetch {location}: {message}")]
    FetchFailed { location: String, message: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Tag '{tag}' not found in {path}")]
    TagNotFound { tag: String, path: PathBuf },

    #[error("Not a cached repository: {path}")]
    NotARepository { path: PathBuf },
}
