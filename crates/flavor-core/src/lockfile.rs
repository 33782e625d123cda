//! Lockfile codec
//!
//! The lockfile is TOML keyed by repository location:
//!
//! ```toml
//! version = "1"
//!
//! [flavors."https://github.com/kana/vim-smartinput.git"]
//! groups = ["default"]
//! locked_version = "1.2.3"
//! repo_name = "kana/vim-smartinput"
//! version_constraint = ">= 0"
//! ```
//!
//! Cache paths are not persisted; they are derived from the cache on load.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use flavor_fs::NormalizedPath;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::cache::RepositoryCache;
use crate::lock::{LockEntry, LockSet};
use crate::spec::{DEFAULT_GROUP, DependencySpec};
use crate::version::{Version, VersionConstraint};
use crate::{Error, Result};

/// Current lockfile format version
pub const FORMAT_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize)]
struct LockfileDocument {
    version: String,
    #[serde(default)]
    flavors: BTreeMap<String, LockedFlavor>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LockedFlavor {
    #[serde(default)]
    groups: Vec<String>,
    locked_version: String,
    repo_name: String,
    version_constraint: String,
}

/// Load the lockfile at `path` under a shared lock.
///
/// A missing file yields an empty [`LockSet`].
pub fn load(path: &Path, cache: &dyn RepositoryCache) -> Result<LockSet> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No lockfile, starting from an empty lock");
            return Ok(LockSet::new());
        }
        Err(e) => return Err(flavor_fs::Error::io(path, e).into()),
    };
    FileExt::lock_shared(&file).map_err(|_| flavor_fs::Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    // Read through the locked handle
    let mut content = String::new();
    (&file)
        .read_to_string(&mut content)
        .map_err(|e| flavor_fs::Error::io(path, e))?;

    parse(&content, path, cache)
}

/// Parse lockfile text. `path` is only used in error messages.
pub fn parse(content: &str, path: &Path, cache: &dyn RepositoryCache) -> Result<LockSet> {
    let invalid = |message: String| Error::LockfileParse {
        path: path.to_path_buf(),
        message,
    };

    let document: LockfileDocument =
        toml::from_str(content).map_err(|e| invalid(e.message().to_string()))?;
    if document.version != FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format version '{}'",
            document.version
        )));
    }

    let mut lock = LockSet::new();
    for (location, flavor) in document.flavors {
        let version = Version::parse(&flavor.locked_version)
            .map_err(|e| invalid(format!("{location}: {e}")))?;
        let constraint = VersionConstraint::parse(&flavor.version_constraint)
            .map_err(|e| invalid(format!("{location}: {e}")))?;

        let spec = DependencySpec {
            name: flavor.repo_name,
            location: location.clone(),
            groups: BTreeSet::from([DEFAULT_GROUP.to_string()]),
            constraint,
        }
        .with_groups(flavor.groups);
        let cached_path = cache.local_path(&location);

        lock.insert(LockEntry::new(spec, version, cached_path));
    }
    Ok(lock)
}

/// Render `lock` as lockfile text. Output is stable for equal lock sets.
pub fn render(lock: &LockSet) -> Result<String> {
    let document = LockfileDocument {
        version: FORMAT_VERSION.to_string(),
        flavors: lock
            .iter()
            .map(|entry| {
                let flavor = LockedFlavor {
                    groups: entry.spec.groups.iter().cloned().collect(),
                    locked_version: entry.version.to_string(),
                    repo_name: entry.spec.name.clone(),
                    version_constraint: entry.spec.constraint.to_string(),
                };
                (entry.location().to_string(), flavor)
            })
            .collect(),
    };
    Ok(toml::to_string(&document)?)
}

/// Write `lock` to `path` atomically.
pub fn save(path: &Path, lock: &LockSet) -> Result<()> {
    let content = render(lock)?;
    flavor_fs::io::write_text(&NormalizedPath::new(path), &content)?;
    tracing::debug!(path = %path.display(), entries = lock.len(), "Saved lockfile");
    Ok(())
}
