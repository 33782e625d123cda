//! Versions and version constraints.
//!
//! A version is one or more dot-separated non-negative integers (`1`,
//! `1.2`, `1.2.3`, `1.2.3.4`). Versions compare segment by segment with
//! missing trailing segments treated as zero, so `1.2` and `1.2.0` are equal.
//!
//! Constraints take one of three forms:
//!
//! - `>= V`: any version at least `V`
//! - `~> V`: at least `V` without rolling over the segment before the last
//!   one written in `V` (see [`pessimistic_ceiling`])
//! - `== V`: exactly `V`
//!
//! # Examples
//!
//! ```
//! use flavor_core::version::{Version, VersionConstraint};
//!
//! let constraint = VersionConstraint::parse("~> 1.1.1").unwrap();
//! let candidates: Vec<Version> = ["1.1.1", "1.1.2", "1.2.0"]
//!     .iter()
//!     .map(|v| Version::parse(v).unwrap())
//!     .collect();
//!
//! let best = constraint.best_match(&candidates).unwrap();
//! assert_eq!(best.to_string(), "1.1.2");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A multi-segment numeric version.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    /// Text as published (tag name), used for display and tag lookup.
    raw: String,
}

impl Version {
    /// Parse a version such as `1.2.3`.
    ///
    /// Anything other than dot-separated ASCII digits is rejected, including
    /// `v` prefixes and pre-release suffixes.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = text.trim();
        if raw.is_empty() {
            return Err(Error::InvalidVersion {
                version: text.to_string(),
                reason: "empty version".to_string(),
            });
        }

        let segments = raw
            .split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::InvalidVersion {
                        version: raw.to_string(),
                        reason: format!("segment '{segment}' is not a number"),
                    });
                }
                segment.parse::<u64>().map_err(|e| Error::InvalidVersion {
                    version: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self {
            segments,
            raw: raw.to_string(),
        })
    }

    /// Build a version from numeric segments.
    ///
    /// # Panics
    /// Panics if `segments` is empty.
    pub fn from_segments(segments: Vec<u64>) -> Self {
        assert!(!segments.is_empty(), "a version needs at least one segment");
        let raw = segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self { segments, raw }
    }

    /// Numeric segments as written.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Segments without trailing zeros; the basis for equality and hashing.
    fn significant(&self) -> &[u64] {
        let len = self
            .segments
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |i| i + 1);
        &self.segments[..len]
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Constraint operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    /// `>=`
    AtLeast,
    /// `~>`
    Pessimistic,
    /// `==`
    Exact,
}

impl ConstraintOp {
    /// Operator as written in flavorfiles and lockfiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::Pessimistic => "~>",
            Self::Exact => "==",
        }
    }
}

/// An operator paired with a version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    op: ConstraintOp,
    version: Version,
}

impl VersionConstraint {
    /// Create a constraint from its parts.
    pub fn new(op: ConstraintOp, version: Version) -> Self {
        Self { op, version }
    }

    /// `>= 0`, satisfied by every version.
    pub fn any() -> Self {
        Self::new(ConstraintOp::AtLeast, Version::from_segments(vec![0]))
    }

    /// Parse `>= V`, `~> V`, `== V` (also `= V`), or a bare `V` meaning
    /// `== V`.
    pub fn parse(constraint: &str) -> Result<Self> {
        let text = constraint.trim();
        let (op, version_str) = if let Some(rest) = text.strip_prefix(">=") {
            (ConstraintOp::AtLeast, rest)
        } else if let Some(rest) = text.strip_prefix("~>") {
            (ConstraintOp::Pessimistic, rest)
        } else if let Some(rest) = text.strip_prefix("==") {
            (ConstraintOp::Exact, rest)
        } else if let Some(rest) = text.strip_prefix('=') {
            (ConstraintOp::Exact, rest)
        } else {
            (ConstraintOp::Exact, text)
        };

        let version = Version::parse(version_str).map_err(|e| Error::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: match e {
                Error::InvalidVersion { reason, .. } => reason,
                other => other.to_string(),
            },
        })?;

        Ok(Self { op, version })
    }

    /// Operator of this constraint.
    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    /// Version operand of this constraint.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check whether `candidate` satisfies this constraint.
    pub fn satisfies(&self, candidate: &Version) -> bool {
        match self.op {
            ConstraintOp::AtLeast => candidate >= &self.version,
            ConstraintOp::Exact => candidate == &self.version,
            ConstraintOp::Pessimistic => {
                candidate >= &self.version
                    && candidate < &pessimistic_ceiling(self.version.segments())
            }
        }
    }

    /// The greatest candidate satisfying this constraint, if any.
    pub fn best_match<'a, I>(&self, candidates: I) -> Option<&'a Version>
    where
        I: IntoIterator<Item = &'a Version>,
    {
        candidates.into_iter().filter(|v| self.satisfies(v)).max()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

/// Exclusive upper bound of `~> V`, keyed by how many segments `V` has.
///
/// | segments | `~> V` allows        | ceiling   |
/// |----------|----------------------|-----------|
/// | `a`      | `a.*`                | `a+1`     |
/// | `a.b`    | `a.y`, `y >= b`      | `a+1`     |
/// | `a.b.c`  | `a.b.x`, `x >= c`    | `a.(b+1)` |
/// | `a.b.c.d` and longer | last segment floats | drop last, bump the new last |
pub fn pessimistic_ceiling(segments: &[u64]) -> Version {
    let bumped = match segments {
        [] => vec![1],
        [major] => vec![major.saturating_add(1)],
        [major, _minor] => vec![major.saturating_add(1)],
        [major, minor, _patch] => vec![*major, minor.saturating_add(1)],
        [prefix @ .., _last] => {
            let mut ceiling = prefix.to_vec();
            if let Some(pinned) = ceiling.last_mut() {
                *pinned = pinned.saturating_add(1);
            }
            ceiling
        }
    };
    Version::from_segments(bumped)
}
