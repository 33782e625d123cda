//! Paths a run works with

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use flavor_fs::FlavorPath;

use crate::{Error, Result};

/// Environment variable overriding the cache root.
pub const CACHE_HOME_ENV: &str = "VIM_FLAVOR_HOME";

/// Cache root under the home directory when [`CACHE_HOME_ENV`] is unset.
pub const CACHE_DIR_NAME: &str = ".vim-flavor";

/// Vimfiles directory under the home directory.
pub const VIMFILES_DIR_NAME: &str = ".vim";

/// Where the flavorfile, the lockfile and the repository cache live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorConfig {
    pub flavorfile_path: PathBuf,
    pub lockfile_path: PathBuf,
    pub cache_root: PathBuf,
}

impl FlavorConfig {
    /// `VimFlavor` and `VimFlavor.lock` inside `project_dir`.
    pub fn in_dir(project_dir: &Path, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            flavorfile_path: project_dir.join(FlavorPath::Flavorfile),
            lockfile_path: project_dir.join(FlavorPath::Lockfile),
            cache_root: cache_root.into(),
        }
    }

    /// Defaults for the current process: files in the working directory and
    /// the cache from [`default_cache_root`].
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::in_dir(&cwd, default_cache_root()?))
    }

    pub fn with_flavorfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.flavorfile_path = path.into();
        self
    }

    pub fn with_lockfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.lockfile_path = path.into();
        self
    }

    pub fn with_cache_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_root = path.into();
        self
    }
}

/// `$VIM_FLAVOR_HOME`, else `<home>/.vim-flavor`.
pub fn default_cache_root() -> Result<PathBuf> {
    cache_root_from(std::env::var_os(CACHE_HOME_ENV), dirs::home_dir())
}

/// [`default_cache_root`] with its inputs passed in. An empty override
/// counts as unset.
pub fn cache_root_from(env_value: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => Ok(PathBuf::from(value)),
        None => home
            .map(|home| home.join(CACHE_DIR_NAME))
            .ok_or(Error::HomeNotFound),
    }
}

/// `<home>/.vim`
pub fn default_vimfiles_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(VIMFILES_DIR_NAME))
        .ok_or(Error::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_uses_well_known_names() {
        let config = FlavorConfig::in_dir(Path::new("/work"), "/cache");
        assert_eq!(config.flavorfile_path, PathBuf::from("/work/VimFlavor"));
        assert_eq!(config.lockfile_path, PathBuf::from("/work/VimFlavor.lock"));
        assert_eq!(config.cache_root, PathBuf::from("/cache"));
    }

    #[test]
    fn test_overrides() {
        let config = FlavorConfig::in_dir(Path::new("/work"), "/cache")
            .with_flavorfile("/etc/Flavors")
            .with_lockfile("/tmp/lock")
            .with_cache_root("/var/cache/flavor");
        assert_eq!(config.flavorfile_path, PathBuf::from("/etc/Flavors"));
        assert_eq!(config.lockfile_path, PathBuf::from("/tmp/lock"));
        assert_eq!(config.cache_root, PathBuf::from("/var/cache/flavor"));
    }

    #[test]
    fn test_cache_root_prefers_env() {
        let root = cache_root_from(Some("/srv/flavor".into()), Some("/home/u".into())).unwrap();
        assert_eq!(root, PathBuf::from("/srv/flavor"));
    }

    #[test]
    fn test_cache_root_falls_back_to_home() {
        let root = cache_root_from(None, Some("/home/u".into())).unwrap();
        assert_eq!(root, PathBuf::from("/home/u/.vim-flavor"));

        let root = cache_root_from(Some(OsString::new()), Some("/home/u".into())).unwrap();
        assert_eq!(root, PathBuf::from("/home/u/.vim-flavor"));
    }

    #[test]
    fn test_cache_root_without_home_fails() {
        assert!(matches!(cache_root_from(None, None), Err(Error::HomeNotFound)));
    }
}
