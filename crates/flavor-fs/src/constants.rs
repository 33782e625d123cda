//! Well-known file and directory names.

use std::path::Path;

/// File and directory names that vim-flavor reads or owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorPath {
    /// The declared-dependency file (`VimFlavor`)
    Flavorfile,
    /// The lockfile (`VimFlavor.lock`)
    Lockfile,
    /// The managed subdirectory under a vimfiles root (`flavors`)
    FlavorsDir,
    /// The generated bootstrap script inside `flavors`
    BootstrapScript,
    /// Late-override directory of a runtime path entry (`after`)
    AfterDir,
    /// Directory under the cache root holding bare clones (`repos`)
    ReposDir,
    /// Advisory lock file under the cache root
    CacheLock,
}

impl FlavorPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flavorfile => "VimFlavor",
            Self::Lockfile => "VimFlavor.lock",
            Self::FlavorsDir => "flavors",
            Self::BootstrapScript => "bootstrap.vim",
            Self::AfterDir => "after",
            Self::ReposDir => "repos",
            Self::CacheLock => ".lock",
        }
    }
}

impl AsRef<Path> for FlavorPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for FlavorPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for FlavorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
