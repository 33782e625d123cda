//! Repository cache
//!
//! [`RepositoryCache`] is the seam between resolution/deployment and the
//! version-control backend. [`GitRepositoryCache`] keeps one bare clone per
//! repository location under `<cache_root>/repos`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use flavor_fs::{FlavorPath, location_digest, zap};
use flavor_git::CachedRepository;

use crate::Result;
use crate::version::Version;

/// Local snapshots of plugin repositories.
///
/// All calls block. Backend failures surface as [`crate::Error::Backend`].
pub trait RepositoryCache {
    /// Where the clone of `location` lives, whether or not it exists yet.
    fn local_path(&self, location: &str) -> PathBuf;

    /// Clone `location` on first use; reuse the existing clone afterwards.
    fn ensure_cloned(&self, location: &str) -> Result<PathBuf>;

    /// Bring the tags of the clone at `local` up to date with upstream.
    fn fetch(&self, local: &Path) -> Result<()>;

    /// Published versions of the clone at `local`.
    ///
    /// Tags that are not versions are left out.
    fn list_versions(&self, local: &Path) -> Result<BTreeSet<Version>>;

    /// Write the files of `version` into `dest`.
    fn checkout_snapshot(&self, local: &Path, version: &Version, dest: &Path) -> Result<()>;
}

/// [`RepositoryCache`] backed by bare git clones.
#[derive(Debug, Clone)]
pub struct GitRepositoryCache {
    root: PathBuf,
}

impl GitRepositoryCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the clone at `path` if it is usable and was cloned from `location`.
    fn open_existing(&self, location: &str, path: &Path) -> Option<CachedRepository> {
        let repo = CachedRepository::open(path).and_then(|repo| {
            let origin = repo.origin_url()?;
            Ok((repo, origin))
        });
        match repo {
            Ok((repo, origin)) if origin == location => Some(repo),
            Ok((repo, origin)) => {
                tracing::warn!(
                    %location,
                    %origin,
                    path = %repo.path().display(),
                    "Discarding cached clone of another location"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    %location,
                    path = %path.display(),
                    error = %e,
                    "Discarding unusable cached clone"
                );
                None
            }
        }
    }
}

impl RepositoryCache for GitRepositoryCache {
    fn local_path(&self, location: &str) -> PathBuf {
        let dir = format!("{}-{}", zap(location), location_digest(location));
        self.root.join(FlavorPath::ReposDir).join(dir)
    }

    fn ensure_cloned(&self, location: &str) -> Result<PathBuf> {
        let path = self.local_path(location);

        if path.exists() {
            if self.open_existing(location, &path).is_some() {
                tracing::debug!(%location, path = %path.display(), "Reusing cached clone");
                return Ok(path);
            }
            flavor_fs::io::remove_path(&path)?;
        }

        tracing::info!(%location, "Cloning");
        CachedRepository::clone_bare(location, &path)?;
        Ok(path)
    }

    fn fetch(&self, local: &Path) -> Result<()> {
        CachedRepository::open(local)?.fetch_tags()?;
        Ok(())
    }

    fn list_versions(&self, local: &Path) -> Result<BTreeSet<Version>> {
        let repo = CachedRepository::open(local)?;
        let mut versions = BTreeSet::new();
        for tag in repo.tag_names()? {
            match Version::parse(&tag) {
                Ok(version) => {
                    versions.insert(version);
                }
                Err(_) => tracing::debug!(%tag, path = %local.display(), "Skipping non-version tag"),
            }
        }
        Ok(versions)
    }

    fn checkout_snapshot(&self, local: &Path, version: &Version, dest: &Path) -> Result<()> {
        let repo = CachedRepository::open(local)?;
        repo.extract_tag(&version.to_string(), dest)?;
        Ok(())
    }
}
