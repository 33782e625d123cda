//! Writing git trees to the filesystem

use std::fs;
use std::path::Path;

use git2::{ObjectType, Repository, Tree};

use crate::Result;

/// Git file mode of an executable blob
const MODE_EXECUTABLE: i32 = 0o100755;
/// Git file mode of a symbolic link
const MODE_SYMLINK: i32 = 0o120000;

/// Recursively write `tree` below `dest`.
pub(crate) fn write_tree(repo: &Repository, tree: &Tree<'_>, dest: &Path) -> Result<()> {
    for entry in tree.iter() {
        let Some(name) = entry.name().filter(|n| is_safe_name(n)) else {
            tracing::warn!(
                name = %String::from_utf8_lossy(entry.name_bytes()),
                "Skipping tree entry with unusable name"
            );
            continue;
        };
        let target = dest.join(name);

        match entry.kind() {
            Some(ObjectType::Tree) => {
                let subtree = repo.find_tree(entry.id())?;
                fs::create_dir_all(&target).map_err(|e| flavor_fs::Error::io(&target, e))?;
                write_tree(repo, &subtree, &target)?;
            }
            Some(ObjectType::Blob) => {
                let blob = repo.find_blob(entry.id())?;
                write_blob(&target, blob.content(), entry.filemode())?;
            }
            Some(ObjectType::Commit) => {
                tracing::warn!(path = %target.display(), "Skipping submodule");
            }
            other => {
                tracing::warn!(path = %target.display(), kind = ?other, "Skipping unexpected tree entry");
            }
        }
    }
    Ok(())
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn write_blob(target: &Path, content: &[u8], mode: i32) -> Result<()> {
    flavor_fs::io::remove_path(target)?;

    if mode == MODE_SYMLINK {
        return write_symlink(target, content);
    }

    fs::write(target, content).map_err(|e| flavor_fs::Error::io(target, e))?;

    #[cfg(unix)]
    if mode == MODE_EXECUTABLE {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(target, fs::Permissions::from_mode(0o755))
            .map_err(|e| flavor_fs::Error::io(target, e))?;
    }

    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &Path, content: &[u8]) -> Result<()> {
    use std::os::unix::ffi::OsStrExt;
    let link_target = std::ffi::OsStr::from_bytes(content);
    std::os::unix::fs::symlink(link_target, target)
        .map_err(|e| flavor_fs::Error::io(target, e))?;
    Ok(())
}

#[cfg(not(unix))]
fn write_symlink(target: &Path, content: &[u8]) -> Result<()> {
    fs::write(target, content).map_err(|e| flavor_fs::Error::io(target, e))?;
    Ok(())
}
