//! Plugin repositories with version tags.
//!
//! Every tag gets its own commit. The files written for a tag identify the
//! tag, so tests can tell which version ended up deployed.

use std::fs;
use std::path::Path;

use git2::{IndexAddOption, Repository, Signature};

/// Tags of a freshly created test repository.
///
/// `nightly` is not a version and must never be picked by the resolver.
pub const INITIAL_TAGS: &[&str] = &["1.0.0", "1.1.1", "1.1.2", "1.2.0", "nightly"];

/// Tags added by [`update_a_test_repo`].
pub const UPDATE_TAGS: &[&str] = &[
    "1.1.3", "1.1.4", "1.1.5", "1.1.6", "1.1.7", "1.1.8", "1.1.9", "1.2.1",
];

/// Content of `plugin/<name>.vim` at `tag`.
pub fn plugin_script(name: &str, tag: &str) -> String {
    format!("let g:{}_version = '{tag}'\n", name.replace('-', "_"))
}

/// Initialise a repository at `path` with one tagged commit per entry in
/// `tags`.
///
/// Each commit writes `plugin/<dir name>.vim`, `after/plugin/<dir name>.vim`
/// and `doc/<dir name>.txt`.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn tagged_repo(path: &Path, tags: &[&str]) -> Repository {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("tagged_repo: failed to create {}: {e}", path.display()));
    let repo = Repository::init(path).unwrap_or_else(|e| {
        panic!("tagged_repo: failed to init repository at {}: {e}", path.display())
    });
    add_tagged_commits(path, tags);
    repo
}

/// Append one tagged commit per entry in `tags` to the repository at `path`.
///
/// # Panics
/// Panics if any git or filesystem operation fails.
pub fn add_tagged_commits(path: &Path, tags: &[&str]) {
    let repo = Repository::open(path).unwrap_or_else(|e| {
        panic!("add_tagged_commits: failed to open {}: {e}", path.display())
    });
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "plugin".to_string());
    let signature = Signature::now("Test User", "test@example.com")
        .unwrap_or_else(|e| panic!("add_tagged_commits: bad signature: {e}"));

    for tag in tags {
        write_file(path, &format!("plugin/{name}.vim"), &plugin_script(&name, tag));
        write_file(
            path,
            &format!("after/plugin/{name}.vim"),
            &format!("\" after script of {name} {tag}\n"),
        );
        write_file(path, &format!("doc/{name}.txt"), &format!("*{name}.txt* {tag}\n"));

        let mut index = repo
            .index()
            .unwrap_or_else(|e| panic!("add_tagged_commits: no index: {e}"));
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("add_tagged_commits: add failed: {e}"));
        index
            .write()
            .unwrap_or_else(|e| panic!("add_tagged_commits: index write failed: {e}"));
        let tree_id = index
            .write_tree()
            .unwrap_or_else(|e| panic!("add_tagged_commits: write_tree failed: {e}"));
        let tree = repo
            .find_tree(tree_id)
            .unwrap_or_else(|e| panic!("add_tagged_commits: find_tree failed: {e}"));

        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let commit_id = repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &format!("Release {tag}"),
                &tree,
                &parents,
            )
            .unwrap_or_else(|e| panic!("add_tagged_commits: commit failed: {e}"));
        let commit = repo
            .find_object(commit_id, None)
            .unwrap_or_else(|e| panic!("add_tagged_commits: find_object failed: {e}"));
        repo.tag_lightweight(tag, &commit, false)
            .unwrap_or_else(|e| panic!("add_tagged_commits: tag {tag} failed: {e}"));
    }
}

/// Create the standard test repository at `path` with [`INITIAL_TAGS`].
pub fn create_a_test_repo(path: &Path) -> Repository {
    tagged_repo(path, INITIAL_TAGS)
}

/// Publish [`UPDATE_TAGS`] to the standard test repository at `path`.
pub fn update_a_test_repo(path: &Path) {
    add_tagged_commits(path, UPDATE_TAGS);
}

/// `file://` URI of a local repository.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&target, content)
        .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", target.display()));
}
