//! Deployment of locked flavors into a vimfiles tree
//!
//! Only `<vimfiles>/flavors` is managed. Each flavor is extracted to its own
//! directory there, anything else inside `flavors` is pruned, and the
//! bootstrap script is rewritten last.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use flavor_fs::{FlavorPath, location_digest, zap_dir_name};

use crate::bootstrap::{self, BootstrapScript};
use crate::cache::RepositoryCache;
use crate::lock::LockEntry;
use crate::version::Version;
use crate::{Error, Result};

/// Prefix of the directories flavors are extracted into before being moved
/// into place.
const STAGING_PREFIX: &str = ".staging-";

/// A flavor as it was deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedFlavor {
    pub name: String,
    pub location: String,
    pub version: Version,
    /// Directory under `flavors`
    pub path: PathBuf,
}

/// `<vimfiles>/flavors`
pub fn flavors_path(vimfiles: &Path) -> PathBuf {
    vimfiles.join(FlavorPath::FlavorsDir)
}

/// Directory name under `flavors` for each entry, keyed by location.
///
/// The name is the stable name passed through [`zap_dir_name`], so it never
/// leaves `flavors` or hides from Vim's glob. Entries whose names collide,
/// or that would replace the bootstrap script, get the first 12 hex digits
/// of their location's SHA-256 appended.
pub fn deploy_dir_names<'e, I>(entries: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'e LockEntry>,
{
    let zapped: Vec<(&str, String)> = entries
        .into_iter()
        .map(|entry| (entry.location(), zap_dir_name(entry.name())))
        .collect();

    let mut uses: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, name) in &zapped {
        *uses.entry(name.as_str()).or_default() += 1;
    }

    zapped
        .iter()
        .map(|(location, name)| {
            let reserved = name == FlavorPath::BootstrapScript.as_str();
            let dir = if reserved || uses[name.as_str()] > 1 {
                format!("{name}-{}", location_digest(location))
            } else {
                name.clone()
            };
            (location.to_string(), dir)
        })
        .collect()
}

/// Materializes lock entries under a vimfiles root.
pub struct Deployer<'a> {
    cache: &'a dyn RepositoryCache,
}

impl<'a> Deployer<'a> {
    pub fn new(cache: &'a dyn RepositoryCache) -> Self {
        Self { cache }
    }

    /// Deploy `entries` into `<vimfiles>/flavors`.
    ///
    /// Nothing outside `flavors` is written apart from creating `vimfiles`
    /// itself. A failure part way leaves earlier flavors in place.
    pub fn deploy<'e, I>(&self, entries: I, vimfiles: &Path) -> Result<Vec<DeployedFlavor>>
    where
        I: IntoIterator<Item = &'e LockEntry>,
    {
        let entries: Vec<&LockEntry> = entries.into_iter().collect();
        let flavors = flavors_path(vimfiles);
        fs::create_dir_all(&flavors).map_err(|e| Error::deployment_io(&flavors, e))?;

        let dir_names = deploy_dir_names(entries.iter().copied());
        let mut deployed = Vec::with_capacity(entries.len());

        for entry in &entries {
            let dir_name = &dir_names[entry.location()];
            let target = flavors.join(dir_name);
            self.deploy_one(entry, &flavors, &target)?;

            tracing::info!(name = %entry.name(), version = %entry.version, path = %target.display(), "Deployed");
            deployed.push(DeployedFlavor {
                name: entry.name().to_string(),
                location: entry.location().to_string(),
                version: entry.version.clone(),
                path: target,
            });
        }

        let keep: BTreeSet<&str> = dir_names.values().map(String::as_str).collect();
        prune(&flavors, &keep)?;

        BootstrapScript::new(keep.iter().copied())
            .write(&flavors)
            .map_err(into_deployment)?;
        tracing::debug!(
            runtimepath = ?bootstrap::runtimepath_order(
                &vimfiles.to_string_lossy(),
                &keep.iter().collect::<Vec<_>>()
            ),
            "Bootstrap runtimepath"
        );

        Ok(deployed)
    }

    /// Extract `entry` into a staging directory and swap it in for `target`.
    fn deploy_one(&self, entry: &LockEntry, flavors: &Path, target: &Path) -> Result<()> {
        let local = self.cache.ensure_cloned(entry.location())?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(flavors)
            .map_err(|e| Error::deployment_io(flavors, e))?;
        match self.cache.checkout_snapshot(&local, &entry.version, staging.path()) {
            // Locked elsewhere at a tag this clone has not fetched yet
            Err(Error::Backend(flavor_git::Error::TagNotFound { .. })) => {
                tracing::info!(name = %entry.name(), version = %entry.version, "Locked version not cached, fetching");
                self.cache.fetch(&local)?;
                self.cache
                    .checkout_snapshot(&local, &entry.version, staging.path())
                    .map_err(into_deployment)?;
            }
            other => other.map_err(into_deployment)?,
        }

        flavor_fs::io::remove_path(target).map_err(Error::deployment)?;
        fs::rename(staging.path(), target).map_err(|e| Error::deployment_io(target, e))?;
        // `staging` no longer exists; dropping it is a no-op

        // Staging directories are created owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(target, fs::Permissions::from_mode(0o755))
                .map_err(|e| Error::deployment_io(target, e))?;
        }
        Ok(())
    }
}

/// Remove everything in `flavors` except the `keep` directories and the
/// bootstrap script.
fn prune(flavors: &Path, keep: &BTreeSet<&str>) -> Result<()> {
    let listing = fs::read_dir(flavors).map_err(|e| Error::deployment_io(flavors, e))?;
    for item in listing {
        let item = item.map_err(|e| Error::deployment_io(flavors, e))?;
        let file_name = item.file_name();
        let name = file_name.to_string_lossy();
        if keep.contains(&*name) || name == FlavorPath::BootstrapScript.as_str() {
            continue;
        }

        let path = item.path();
        tracing::info!(path = %path.display(), "Removing stale flavor content");
        flavor_fs::io::remove_path(&path).map_err(Error::deployment)?;
    }
    Ok(())
}

/// Report filesystem failures raised while writing the tree as deployment
/// failures.
fn into_deployment(err: Error) -> Error {
    match err {
        Error::Backend(flavor_git::Error::Fs(e)) | Error::Fs(e) => Error::deployment(e),
        other => other,
    }
}
