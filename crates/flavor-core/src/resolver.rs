//! Resolution of declared dependencies into a lock

use crate::cache::RepositoryCache;
use crate::lock::{LockEntry, LockSet};
use crate::spec::{DependencySpec, SpecSet};
use crate::{Error, Result};

/// How existing lock entries are treated during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Keep a locked version while it still satisfies the declared
    /// constraint. Used by `install`.
    PreferLocked,
    /// Always pick the newest satisfying version. Used by `upgrade`.
    ForceLatest,
}

/// Turns declared dependencies plus an existing lock into a new lock.
pub struct Resolver<'a> {
    cache: &'a dyn RepositoryCache,
}

impl<'a> Resolver<'a> {
    pub fn new(cache: &'a dyn RepositoryCache) -> Self {
        Self { cache }
    }

    /// Resolve every spec in declaration order.
    ///
    /// The result holds exactly one entry per spec; entries of `existing`
    /// whose location is no longer declared are dropped. Any failure aborts
    /// the whole resolution and nothing is returned.
    pub fn resolve(
        &self,
        specs: &SpecSet,
        existing: &LockSet,
        policy: ResolutionPolicy,
    ) -> Result<LockSet> {
        let mut lock = LockSet::new();

        for spec in specs {
            let reusable = match policy {
                ResolutionPolicy::PreferLocked => existing
                    .get(&spec.location)
                    .filter(|locked| spec.constraint.satisfies(&locked.version)),
                ResolutionPolicy::ForceLatest => None,
            };

            let entry = match reusable {
                Some(locked) => {
                    tracing::debug!(
                        name = %spec.name,
                        version = %locked.version,
                        "Keeping locked version"
                    );
                    LockEntry::new(spec.clone(), locked.version.clone(), locked.cached_path.clone())
                }
                None => self.resolve_latest(spec)?,
            };
            lock.insert(entry);
        }

        for stale in existing.iter().filter(|e| !specs.contains(e.location())) {
            tracing::info!(name = %stale.name(), location = %stale.location(), "Dropping undeclared flavor from lock");
        }

        Ok(lock)
    }

    fn resolve_latest(&self, spec: &DependencySpec) -> Result<LockEntry> {
        let local = self.cache.ensure_cloned(&spec.location)?;
        self.cache.fetch(&local)?;
        let versions = self.cache.list_versions(&local)?;

        let version = spec
            .constraint
            .best_match(&versions)
            .cloned()
            .ok_or_else(|| Error::ConstraintUnsatisfiable {
                name: spec.name.clone(),
                location: spec.location.clone(),
                constraint: spec.constraint.to_string(),
            })?;

        tracing::debug!(
            name = %spec.name,
            constraint = %spec.constraint,
            candidates = versions.len(),
            %version,
            "Resolved"
        );
        Ok(LockEntry::new(spec.clone(), version, local))
    }
}
