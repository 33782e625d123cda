//! Outcome of an install or upgrade run

use std::fmt;
use std::path::PathBuf;

use crate::deployer::DeployedFlavor;
use crate::lock::LockSet;
use crate::version::Version;

/// How a deployed flavor's version relates to the previous lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// Not in the previous lock
    Added,
    Upgraded { from: Version },
    Downgraded { from: Version },
    Unchanged,
}

impl ChangeKind {
    fn between(previous: Option<&Version>, current: &Version) -> Self {
        match previous {
            None => Self::Added,
            Some(from) if current > from => Self::Upgraded { from: from.clone() },
            Some(from) if current < from => Self::Downgraded { from: from.clone() },
            Some(_) => Self::Unchanged,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Upgraded { from } => write!(f, "upgraded from {from}"),
            Self::Downgraded { from } => write!(f, "downgraded from {from}"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// One deployed flavor in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorChange {
    pub name: String,
    pub version: Version,
    pub path: PathBuf,
    pub change: ChangeKind,
}

/// What an install or upgrade did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Deployed flavors, in lock order
    pub flavors: Vec<FlavorChange>,
    /// Names of lock entries dropped because they are no longer declared
    pub removed: Vec<String>,
}

impl InstallReport {
    /// Compare what was deployed against the lock that existed before the run.
    pub fn build(previous: &LockSet, current: &LockSet, deployed: Vec<DeployedFlavor>) -> Self {
        let flavors = deployed
            .into_iter()
            .map(|flavor| {
                let before = previous.get(&flavor.location).map(|e| &e.version);
                FlavorChange {
                    change: ChangeKind::between(before, &flavor.version),
                    name: flavor.name,
                    version: flavor.version,
                    path: flavor.path,
                }
            })
            .collect();

        let removed = previous
            .iter()
            .filter(|entry| !current.contains(entry.location()))
            .map(|entry| entry.name().to_string())
            .collect();

        Self { flavors, removed }
    }

    /// Whether any deployed version differs from the previous lock.
    pub fn has_changes(&self) -> bool {
        !self.removed.is_empty()
            || self
                .flavors
                .iter()
                .any(|f| f.change != ChangeKind::Unchanged)
    }
}
