//! Resolved dependencies

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::spec::DependencySpec;
use crate::version::Version;

/// A dependency pinned to a concrete version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// The declaration as it stood when this entry was produced.
    pub spec: DependencySpec,
    pub version: Version,
    /// Cache clone that supplied `version`. Derived, never persisted.
    pub cached_path: PathBuf,
}

impl LockEntry {
    pub fn new(spec: DependencySpec, version: Version, cached_path: PathBuf) -> Self {
        Self {
            spec,
            version,
            cached_path,
        }
    }

    pub fn location(&self) -> &str {
        &self.spec.location
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Lock entries keyed by repository location.
///
/// Iteration is ordered by location so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockSet {
    entries: BTreeMap<String, LockEntry>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` under its own location, returning any entry it replaced.
    pub fn insert(&mut self, entry: LockEntry) -> Option<LockEntry> {
        self.entries.insert(entry.location().to_string(), entry)
    }

    pub fn get(&self, location: &str) -> Option<&LockEntry> {
        self.entries.get(location)
    }

    pub fn remove(&mut self, location: &str) -> Option<LockEntry> {
        self.entries.remove(location)
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    /// Entries ordered by location.
    pub fn iter(&self) -> impl Iterator<Item = &LockEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LockEntry> for LockSet {
    fn from_iter<T: IntoIterator<Item = LockEntry>>(iter: T) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}
