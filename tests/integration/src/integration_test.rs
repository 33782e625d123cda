//! End-to-end integration tests for install and upgrade
//!
//! These tests drive the Facade against real git repositories: flavorfile
//! loading -> resolution -> lockfile -> deployment.

use std::fs;
use std::path::PathBuf;

use flavor_core::config::FlavorConfig;
use flavor_core::{
    ChangeKind, DependencySpec, Error, Facade, GitRepositoryCache, LockEntry, LockSet,
    RepositoryCache, Version,
    lockfile,
};
use flavor_fs::FlavorPath;
use flavor_test_utils::git::{create_a_test_repo, file_uri, update_a_test_repo};
use flavor_test_utils::project::TestProject;
use pretty_assertions::assert_eq;

/// A project with one origin repository declared as `~> 1.1.1`.
struct Scenario {
    project: TestProject,
    origin: PathBuf,
}

impl Scenario {
    fn new() -> Self {
        Self::with_constraint("~> 1.1.1")
    }

    fn with_constraint(constraint: &str) -> Self {
        let project = TestProject::new();
        let origin = project.origin("origin");
        create_a_test_repo(&origin);
        let scenario = Self { project, origin };
        scenario.declare(constraint);
        scenario
    }

    fn declare(&self, constraint: &str) {
        self.project
            .write_flavorfile(&format!(
                "flavor '{}', '{constraint}', name: 'origin'\n",
                self.location()
            ));
    }

    fn location(&self) -> String {
        file_uri(&self.origin)
    }

    fn config(&self) -> FlavorConfig {
        FlavorConfig::in_dir(self.project.root(), self.project.cache_root())
    }

    fn facade(&self) -> Facade {
        Facade::new(self.config())
    }

    fn cache(&self) -> GitRepositoryCache {
        GitRepositoryCache::new(self.project.cache_root())
    }

    fn locked_versions(&self) -> Vec<String> {
        lockfile::load(&self.project.lockfile_path(), &self.cache())
            .unwrap()
            .iter()
            .map(|entry| entry.version.to_string())
            .collect()
    }
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_default_paths_follow_project_dir() {
    let project = TestProject::new();
    let config = FlavorConfig::in_dir(project.root(), project.cache_root());

    assert_eq!(config.flavorfile_path, project.flavorfile_path());
    assert_eq!(config.lockfile_path, project.lockfile_path());

    let facade = Facade::new(config);
    assert!(facade.specs().is_none());
    assert!(facade.lock().is_none());
}

#[test]
fn test_load_reads_flavorfile_and_lockfile() {
    let project = TestProject::new();
    project.write_flavorfile("flavor 'kana/vim-smartinput'\nflavor 'kana/vim-smarttill'\n");
    fs::write(
        project.lockfile_path(),
        r#"version = "1"

[flavors."https://github.com/kana/vim-smartinput.git"]
groups = ["default"]
locked_version = "1.2.3"
repo_name = "kana/vim-smartinput"
version_constraint = ">= 0"
"#,
    )
    .unwrap();
    let cache = GitRepositoryCache::new(project.cache_root());
    let mut facade = Facade::new(FlavorConfig::in_dir(project.root(), project.cache_root()));

    facade.load().unwrap();

    let specs = facade.specs().unwrap();
    assert_eq!(specs.len(), 2);
    assert_eq!(
        specs.get("https://github.com/kana/vim-smartinput.git"),
        Some(&DependencySpec::new("kana/vim-smartinput"))
    );
    assert_eq!(
        specs.get("https://github.com/kana/vim-smarttill.git"),
        Some(&DependencySpec::new("kana/vim-smarttill"))
    );

    let location = "https://github.com/kana/vim-smartinput.git";
    let expected: LockSet = [LockEntry::new(
        DependencySpec::new("kana/vim-smartinput"),
        Version::parse("1.2.3").unwrap(),
        cache.local_path(location),
    )]
    .into_iter()
    .collect();
    assert_eq!(facade.lock(), Some(&expected));
}

#[test]
fn test_missing_lockfile_loads_empty() {
    let project = TestProject::new();
    project.write_flavorfile("flavor 'kana/vim-smartinput'\n");
    let config = FlavorConfig::in_dir(project.root(), project.cache_root())
        .with_lockfile(project.root().join("VimFlavor.lock.xxx"));
    let mut facade = Facade::new(config);

    facade.load().unwrap();

    assert!(facade.lock().unwrap().is_empty());
}

#[test]
fn test_saved_lock_loads_back() {
    let project = TestProject::new();
    project.write_flavorfile("");
    let cache = GitRepositoryCache::new(project.cache_root());
    let location = "https://github.com/kana/vim-smartinput.git";
    let lock: LockSet = [LockEntry::new(
        DependencySpec::new("kana/vim-smartinput"),
        Version::parse("1.2.3").unwrap(),
        cache.local_path(location),
    )]
    .into_iter()
    .collect();

    lockfile::save(&project.lockfile_path(), &lock).unwrap();
    let mut facade = Facade::new(FlavorConfig::in_dir(project.root(), project.cache_root()));
    facade.load().unwrap();

    assert_eq!(facade.lock(), Some(&lock));
    project.assert_file_contains("VimFlavor.lock", "version = \"1\"");
    project.assert_file_contains("VimFlavor.lock", "locked_version = \"1.2.3\"");
}

// =============================================================================
// Install
// =============================================================================

#[test]
fn test_install_writes_lock_and_vimfiles() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    assert!(!scenario.project.lockfile_path().exists());
    assert!(!vimfiles.exists());

    let report = scenario.facade().install(&vimfiles).unwrap();

    assert!(scenario.project.lockfile_path().exists());
    assert_eq!(report.flavors.len(), 1);
    let flavor = &report.flavors[0];
    assert_eq!(flavor.version, Version::parse("1.1.2").unwrap());
    assert_eq!(flavor.change, ChangeKind::Added);
    assert!(flavor.path.join("plugin/origin.vim").is_file());
    assert!(vimfiles.join(FlavorPath::FlavorsDir).join(FlavorPath::BootstrapScript).is_file());
    assert!(scenario.cache().root().join(FlavorPath::ReposDir).is_dir());
}

#[test]
fn test_install_respects_existing_lock() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();

    scenario.facade().install(&vimfiles).unwrap();
    let first = scenario.locked_versions();
    update_a_test_repo(&scenario.origin);
    let report = scenario.facade().install(&vimfiles).unwrap();

    assert_eq!(first, vec!["1.1.2"]);
    assert_eq!(scenario.locked_versions(), first);
    assert!(!report.has_changes());
}

#[test]
fn test_install_relocks_when_locked_version_no_longer_satisfies() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    scenario.facade().install(&vimfiles).unwrap();

    scenario.declare("~> 1.1.3");
    update_a_test_repo(&scenario.origin);
    let report = scenario.facade().install(&vimfiles).unwrap();

    assert_eq!(scenario.locked_versions(), vec!["1.1.9"]);
    assert_eq!(
        report.flavors[0].change,
        ChangeKind::Upgraded {
            from: Version::parse("1.1.2").unwrap()
        }
    );
    scenario.project.assert_file_contains(
        "VimFlavor.lock",
        "version_constraint = \"~> 1.1.3\"",
    );
}

#[test]
fn test_install_keeps_lock_when_new_constraint_still_holds() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    scenario.facade().install(&vimfiles).unwrap();

    scenario.declare("~> 1.1.2");
    update_a_test_repo(&scenario.origin);
    scenario.facade().install(&vimfiles).unwrap();

    assert_eq!(scenario.locked_versions(), vec!["1.1.2"]);
    scenario.project.assert_file_contains(
        "VimFlavor.lock",
        "version_constraint = \"~> 1.1.2\"",
    );
}

#[test]
fn test_install_fetches_locked_version_missing_from_cache() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    scenario.facade().install(&vimfiles).unwrap();

    // Lockfile committed elsewhere after upstream moved on
    update_a_test_repo(&scenario.origin);
    let lock = fs::read_to_string(scenario.project.lockfile_path()).unwrap();
    fs::write(
        scenario.project.lockfile_path(),
        lock.replace("locked_version = \"1.1.2\"", "locked_version = \"1.1.9\""),
    )
    .unwrap();
    scenario.facade().install(&vimfiles).unwrap();

    assert_eq!(scenario.locked_versions(), vec!["1.1.9"]);
    scenario
        .project
        .assert_file_contains("vimfiles/flavors/origin/plugin/origin.vim", "'1.1.9'");
}

#[test]
fn test_dot_names_deploy_inside_flavors() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    let hidden = scenario.project.origin("hidden");
    create_a_test_repo(&hidden);
    fs::create_dir_all(&vimfiles).unwrap();
    fs::write(vimfiles.join("vimrc"), "set nocompatible\n").unwrap();
    scenario.project.write_flavorfile(&format!(
        "flavor '{}', name: '..'\nflavor '{}', name: '.hidden'\n",
        scenario.location(),
        file_uri(&hidden)
    ));

    scenario.facade().install(&vimfiles).unwrap();
    scenario.facade().install(&vimfiles).unwrap();

    scenario.project.assert_file_contains("vimfiles/vimrc", "set nocompatible");
    scenario.project.assert_exists("vimfiles/flavors/_./plugin/origin.vim");
    scenario.project.assert_exists("vimfiles/flavors/_hidden/plugin/hidden.vim");
    scenario.project.assert_not_exists("vimfiles/flavors/.hidden");
}

#[test]
fn test_install_with_same_facade_twice() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    let mut facade = scenario.facade();

    facade.install(&vimfiles).unwrap();
    let first = facade.lock().cloned();
    facade.install(&vimfiles).unwrap();

    assert_eq!(facade.lock().cloned(), first);
}

#[test]
fn test_deploy_removes_stray_flavor_content_only() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    scenario.facade().install(&vimfiles).unwrap();

    fs::write(vimfiles.join("foo"), "").unwrap();
    fs::write(scenario.project.flavors_dir().join("foo"), "").unwrap();
    scenario.facade().install(&vimfiles).unwrap();

    scenario.project.assert_exists("vimfiles/foo");
    scenario.project.assert_not_exists("vimfiles/flavors/foo");
}

#[test]
fn test_undeclared_flavor_is_dropped() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    let other = scenario.project.origin("other");
    create_a_test_repo(&other);
    scenario.project.write_flavorfile(&format!(
        "flavor '{}', '~> 1.1.1', name: 'origin'\nflavor '{}', name: 'other'\n",
        scenario.location(),
        file_uri(&other)
    ));
    scenario.facade().install(&vimfiles).unwrap();
    scenario.project.assert_exists("vimfiles/flavors/other");

    scenario.declare("~> 1.1.1");
    let report = scenario.facade().install(&vimfiles).unwrap();

    assert_eq!(report.removed, vec!["other".to_string()]);
    assert_eq!(scenario.locked_versions().len(), 1);
    scenario.project.assert_not_exists("vimfiles/flavors/other");
}

#[test]
fn test_unsatisfiable_install_keeps_previous_state() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();
    scenario.facade().install(&vimfiles).unwrap();
    let lock_before = fs::read_to_string(scenario.project.lockfile_path()).unwrap();

    scenario.declare("~> 9.0");
    let result = scenario.facade().install(&vimfiles);

    assert!(matches!(result, Err(Error::ConstraintUnsatisfiable { .. })));
    assert_eq!(
        fs::read_to_string(scenario.project.lockfile_path()).unwrap(),
        lock_before
    );
    scenario
        .project
        .assert_file_contains("vimfiles/flavors/origin/plugin/origin.vim", "'1.1.2'");
}

#[test]
fn test_install_without_flavorfile_fails() {
    let project = TestProject::new();
    let mut facade = Facade::new(FlavorConfig::in_dir(project.root(), project.cache_root()));

    let result = facade.install(&project.vimfiles());

    assert!(matches!(result, Err(Error::MissingSpecSource { .. })));
    project.assert_not_exists("VimFlavor.lock");
    project.assert_not_exists("vimfiles");
}

// =============================================================================
// Upgrade
// =============================================================================

#[test]
fn test_upgrade_writes_lock_and_vimfiles() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();

    scenario.facade().upgrade(&vimfiles).unwrap();

    assert_eq!(scenario.locked_versions(), vec!["1.1.2"]);
    scenario.project.assert_exists("vimfiles/flavors/origin/plugin/origin.vim");
}

#[test]
fn test_upgrade_always_moves_to_newest() {
    let scenario = Scenario::new();
    let vimfiles = scenario.project.vimfiles();

    scenario.facade().upgrade(&vimfiles).unwrap();
    update_a_test_repo(&scenario.origin);
    scenario.facade().upgrade(&vimfiles).unwrap();

    assert_eq!(scenario.locked_versions(), vec!["1.1.9"]);
    scenario
        .project
        .assert_file_contains("vimfiles/flavors/origin/plugin/origin.vim", "'1.1.9'");
}
