//! Entry point driving load, resolve, save and deploy

use std::collections::BTreeSet;
use std::path::Path;

use flavor_fs::DirLock;

use crate::cache::{GitRepositoryCache, RepositoryCache};
use crate::config::FlavorConfig;
use crate::deployer::{DeployedFlavor, Deployer};
use crate::lock::LockSet;
use crate::report::InstallReport;
use crate::resolver::{ResolutionPolicy, Resolver};
use crate::spec::SpecSet;
use crate::{Error, Result, flavorfile, lockfile};

/// Owns the declared dependencies and the lock for one run.
///
/// `specs` and `lock` stay `None` until [`Facade::load`] runs. A missing
/// lockfile loads as an empty lock; a missing flavorfile leaves `specs`
/// unset, which `install` and `upgrade` report as
/// [`Error::MissingSpecSource`].
pub struct Facade {
    config: FlavorConfig,
    cache: Box<dyn RepositoryCache>,
    groups: BTreeSet<String>,
    specs: Option<SpecSet>,
    lock: Option<LockSet>,
}

impl Facade {
    /// Facade backed by git clones under `config.cache_root`.
    pub fn new(config: FlavorConfig) -> Self {
        let cache = GitRepositoryCache::new(config.cache_root.clone());
        Self::with_cache(config, Box::new(cache))
    }

    pub fn with_cache(config: FlavorConfig, cache: Box<dyn RepositoryCache>) -> Self {
        Self {
            config,
            cache,
            groups: BTreeSet::new(),
            specs: None,
            lock: None,
        }
    }

    /// Deploy only flavors in at least one of `groups`. Empty means all.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(&self) -> &FlavorConfig {
        &self.config
    }

    pub fn specs(&self) -> Option<&SpecSet> {
        self.specs.as_ref()
    }

    pub fn lock(&self) -> Option<&LockSet> {
        self.lock.as_ref()
    }

    /// Read the flavorfile and the lockfile.
    pub fn load(&mut self) -> Result<()> {
        let specs = flavorfile::load_if_exists(&self.config.flavorfile_path)?;
        if specs.is_none() {
            tracing::debug!(path = %self.config.flavorfile_path.display(), "No flavorfile");
        }
        let lock = lockfile::load(&self.config.lockfile_path, self.cache.as_ref())?;

        self.specs = specs;
        self.lock = Some(lock);
        Ok(())
    }

    /// Resolve the loaded specs against the loaded lock.
    ///
    /// The lock is replaced only when resolution succeeds.
    pub fn resolve(&mut self, policy: ResolutionPolicy) -> Result<&LockSet> {
        let specs = self.specs.as_ref().ok_or_else(|| Error::MissingSpecSource {
            path: self.config.flavorfile_path.clone(),
        })?;
        let existing = self.lock.clone().unwrap_or_default();

        tracing::info!(flavors = specs.len(), ?policy, "Resolving");
        let resolved = Resolver::new(self.cache.as_ref()).resolve(specs, &existing, policy)?;
        Ok(self.lock.insert(resolved))
    }

    /// Write the current lock to the lockfile.
    pub fn save_lock(&self) -> Result<()> {
        let lock = self.lock.as_ref().ok_or(Error::NotLoaded { what: "lock" })?;
        lockfile::save(&self.config.lockfile_path, lock)
    }

    /// Deploy the current lock into `vimfiles`, honouring the group filter.
    pub fn deploy(&self, vimfiles: &Path) -> Result<Vec<DeployedFlavor>> {
        let lock = self.lock.as_ref().ok_or(Error::NotLoaded { what: "lock" })?;
        let selected = lock
            .iter()
            .filter(|entry| self.groups.is_empty() || entry.spec.in_any_group(&self.groups));
        Deployer::new(self.cache.as_ref()).deploy(selected, vimfiles)
    }

    /// Resolve preferring locked versions, save the lock and deploy.
    pub fn install(&mut self, vimfiles: &Path) -> Result<InstallReport> {
        self.run(vimfiles, ResolutionPolicy::PreferLocked)
    }

    /// Resolve to the newest allowed versions, save the lock and deploy.
    pub fn upgrade(&mut self, vimfiles: &Path) -> Result<InstallReport> {
        self.run(vimfiles, ResolutionPolicy::ForceLatest)
    }

    fn run(&mut self, vimfiles: &Path, policy: ResolutionPolicy) -> Result<InstallReport> {
        let root = &self.config.cache_root;
        let guard = match DirLock::try_acquire(root)? {
            Some(guard) => guard,
            None => {
                tracing::info!(path = %root.display(), "Waiting for another run to release the cache");
                DirLock::acquire(root)?
            }
        };
        tracing::debug!(lock = %guard.path().display(), "Holding cache lock");

        self.load()?;
        let previous = self.lock.clone().unwrap_or_default();
        self.resolve(policy)?;
        self.save_lock()?;
        let deployed = self.deploy(vimfiles)?;

        let current = self.lock.as_ref().ok_or(Error::NotLoaded { what: "lock" })?;
        let report = InstallReport::build(&previous, current, deployed);
        tracing::info!(
            deployed = report.flavors.len(),
            removed = report.removed.len(),
            vimfiles = %vimfiles.display(),
            "Completed"
        );
        Ok(report)
    }
}
