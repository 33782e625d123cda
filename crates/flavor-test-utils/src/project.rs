//! [`TestProject`] builder for vim-flavor test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a VimFlavor project, a cache root, a
/// vimfiles target and any number of origin repositories.
///
/// # Example
///
/// ```rust,no_run
/// use flavor_test_utils::project::TestProject;
///
/// let project = TestProject::new();
/// let origin = project.origin("vim-sample");
/// project.write_flavorfile(&format!("flavor 'file://{}', '~> 1.1.1'\n", origin.display()));
/// project.assert_not_exists("vimfiles");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `<root>/VimFlavor`
    pub fn flavorfile_path(&self) -> PathBuf {
        self.root().join("VimFlavor")
    }

    /// `<root>/VimFlavor.lock`
    pub fn lockfile_path(&self) -> PathBuf {
        self.root().join("VimFlavor.lock")
    }

    /// `<root>/cache`
    pub fn cache_root(&self) -> PathBuf {
        self.root().join("cache")
    }

    /// `<root>/vimfiles`
    pub fn vimfiles(&self) -> PathBuf {
        self.root().join("vimfiles")
    }

    /// `<root>/vimfiles/flavors`
    pub fn flavors_dir(&self) -> PathBuf {
        self.vimfiles().join("flavors")
    }

    /// Path for an origin repository named `name` (not created).
    pub fn origin(&self, name: &str) -> PathBuf {
        self.root().join("origins").join(name)
    }

    /// Write `content` to the project's VimFlavor.
    pub fn write_flavorfile(&self, content: &str) {
        fs::write(self.flavorfile_path(), content).unwrap();
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to the root) contains
    /// `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
