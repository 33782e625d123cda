//! Error types for flavor-core

use std::path::PathBuf;

/// Result type for flavor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in flavor-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No published version satisfies a dependency's constraint
    #[error("No version of {name} ({location}) satisfies '{constraint}'")]
    ConstraintUnsatisfiable {
        name: String,
        location: String,
        constraint: String,
    },

    /// The declared-dependency file is required but absent
    #[error("Flavorfile not found at {path}")]
    MissingSpecSource { path: PathBuf },

    /// Filesystem failure while materializing the deployed tree
    #[error("Deployment failed at {path}: {source}")]
    Deployment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unparseable version text
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Unparseable constraint text
    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Syntax error in the flavorfile
    #[error("Flavorfile line {line}: {message}")]
    FlavorfileParse { line: usize, message: String },

    /// Malformed lockfile content
    #[error("Lockfile {path} is invalid: {message}")]
    LockfileParse { path: PathBuf, message: String },

    /// An operation needed state that `load()` has not populated
    #[error("{what} has not been loaded")]
    NotLoaded { what: &'static str },

    /// No home directory to derive default paths from
    #[error("Cannot determine the home directory")]
    HomeNotFound,

    // Transparent wrappers for underlying crate errors
    /// Repository cache backend failure (clone, fetch, checkout)
    #[error(transparent)]
    Backend(#[from] flavor_git::Error),

    /// Filesystem error from flavor-fs
    #[error(transparent)]
    Fs(#[from] flavor_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Wrap a filesystem error raised while deploying.
    ///
    /// I/O failures become [`Error::Deployment`]; anything else is kept as is.
    pub(crate) fn deployment(err: flavor_fs::Error) -> Self {
        match err {
            flavor_fs::Error::Io { path, source } => Self::Deployment { path, source },
            other => Self::Fs(other),
        }
    }

    pub(crate) fn deployment_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Deployment {
            path: path.into(),
            source,
        }
    }
}
