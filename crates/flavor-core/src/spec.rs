//! Declared dependencies and the ordered set holding them

use std::collections::BTreeSet;

use crate::version::VersionConstraint;

/// Group every dependency belongs to unless declared otherwise.
pub const DEFAULT_GROUP: &str = "default";

/// Host used for `user/repo` shorthands.
const GITHUB_PREFIX: &str = "https://github.com/";

/// Account holding the vim.org script mirror, used for bare names.
const VIM_SCRIPTS_ACCOUNT: &str = "vim-scripts";

/// One declared dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Stable name; decides the deploy directory.
    pub name: String,
    /// Repository location; the key of the dependency everywhere.
    pub location: String,
    /// Usage groups, e.g. `default` or `development`.
    pub groups: BTreeSet<String>,
    pub constraint: VersionConstraint,
}

impl DependencySpec {
    /// Declare a dependency the way a flavorfile line names it.
    ///
    /// The stable name is the declared text, the location is derived with
    /// [`location_for`], the group is `default`, and the constraint is
    /// `>= 0`.
    pub fn new(declared: &str) -> Self {
        Self {
            name: declared.to_string(),
            location: location_for(declared),
            groups: BTreeSet::from([DEFAULT_GROUP.to_string()]),
            constraint: VersionConstraint::any(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_constraint(mut self, constraint: VersionConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Replace the groups. An empty iterator keeps `default`.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: BTreeSet<String> = groups.into_iter().map(Into::into).collect();
        if !groups.is_empty() {
            self.groups = groups;
        }
        self
    }

    /// Whether this dependency belongs to any of `groups`.
    pub fn in_any_group(&self, groups: &BTreeSet<String>) -> bool {
        !self.groups.is_disjoint(groups)
    }
}

/// Derive the repository location from the text a flavorfile declares.
///
/// - `user/repo` becomes `https://github.com/user/repo.git`
/// - a bare `repo` becomes `https://github.com/vim-scripts/repo.git`
/// - URIs (`scheme://...`), scp-style `git@host:path` and absolute paths are
///   kept verbatim
pub fn location_for(declared: &str) -> String {
    let declared = declared.trim();
    if is_verbatim_location(declared) {
        return declared.to_string();
    }

    match declared.split_once('/') {
        Some(_) => format!("{GITHUB_PREFIX}{declared}.git"),
        None => format!("{GITHUB_PREFIX}{VIM_SCRIPTS_ACCOUNT}/{declared}.git"),
    }
}

fn is_verbatim_location(declared: &str) -> bool {
    declared.contains("://")
        || declared.starts_with("git@")
        || declared.starts_with('/')
        || declared.starts_with('~')
        || is_windows_absolute(declared)
}

fn is_windows_absolute(declared: &str) -> bool {
    let bytes = declared.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/')
}

/// Declared dependencies in declaration order, unique by location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecSet {
    specs: Vec<DependencySpec>,
}

impl SpecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency.
    ///
    /// Re-declaring a location replaces the earlier declaration but keeps
    /// its position.
    pub fn insert(&mut self, spec: DependencySpec) {
        match self.specs.iter_mut().find(|s| s.location == spec.location) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, location: &str) -> Option<&DependencySpec> {
        self.specs.iter().find(|s| s.location == location)
    }

    pub fn get_mut(&mut self, location: &str) -> Option<&mut DependencySpec> {
        self.specs.iter_mut().find(|s| s.location == location)
    }

    pub fn contains(&self, location: &str) -> bool {
        self.get(location).is_some()
    }

    /// Dependencies in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DependencySpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<DependencySpec> for SpecSet {
    fn from_iter<T: IntoIterator<Item = DependencySpec>>(iter: T) -> Self {
        let mut set = Self::new();
        for spec in iter {
            set.insert(spec);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SpecSet {
    type Item = &'a DependencySpec;
    type IntoIter = std::slice::Iter<'a, DependencySpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_for_github_shorthand() {
        assert_eq!(
            location_for("kana/vim-smartinput"),
            "https://github.com/kana/vim-smartinput.git"
        );
    }

    #[test]
    fn test_location_for_vim_scripts_name() {
        assert_eq!(
            location_for("molokai"),
            "https://github.com/vim-scripts/molokai.git"
        );
    }

    #[test]
    fn test_location_for_verbatim_forms() {
        for declared in [
            "file:///tmp/test/origin",
            "git://github.com/kana/vim-smartinput.git",
            "git@github.com:kana/vim-smartinput.git",
            "/srv/git/plugin",
            "C:\\src\\plugin",
        ] {
            assert_eq!(location_for(declared), declared);
        }
    }

    #[test]
    fn test_new_spec_defaults() {
        let spec = DependencySpec::new("kana/vim-smartinput");
        assert_eq!(spec.name, "kana/vim-smartinput");
        assert_eq!(spec.groups, BTreeSet::from(["default".to_string()]));
        assert_eq!(spec.constraint.to_string(), ">= 0");
    }

    #[test]
    fn test_with_empty_groups_keeps_default() {
        let spec = DependencySpec::new("a/b").with_groups(Vec::<String>::new());
        assert!(spec.groups.contains(DEFAULT_GROUP));
    }

    #[test]
    fn test_spec_set_preserves_declaration_order() {
        let set: SpecSet = ["z/last", "a/first", "m/middle"]
            .into_iter()
            .map(DependencySpec::new)
            .collect();
        let names: Vec<&str> = set.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["z/last", "a/first", "m/middle"]);
    }

    #[test]
    fn test_spec_set_redeclaration_replaces_in_place() {
        let mut set = SpecSet::new();
        set.insert(DependencySpec::new("a/one"));
        set.insert(DependencySpec::new("b/two"));
        set.insert(
            DependencySpec::new("a/one").with_constraint(VersionConstraint::parse("~> 1.0").unwrap()),
        );

        assert_eq!(set.len(), 2);
        let first = set.iter().next().unwrap();
        assert_eq!(first.name, "a/one");
        assert_eq!(first.constraint.to_string(), "~> 1.0");
    }

    #[test]
    fn test_in_any_group() {
        let spec = DependencySpec::new("a/b").with_groups(["development"]);
        assert!(spec.in_any_group(&BTreeSet::from(["development".to_string()])));
        assert!(!spec.in_any_group(&BTreeSet::from(["default".to_string()])));
    }
}
