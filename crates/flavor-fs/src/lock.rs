//! Advisory directory locks

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, FlavorPath, Result};

/// An exclusive advisory lock over a directory.
///
/// The lock is taken on a `.lock` file inside the directory and released
/// when the guard is dropped. Processes that do not take the lock are not
/// prevented from touching the directory.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Block until the exclusive lock on `dir` is held.
    ///
    /// Creates `dir` when it does not exist yet.
    pub fn acquire(dir: &Path) -> Result<Self> {
        let (file, path) = open_lock_file(dir)?;
        FileExt::lock_exclusive(&file).map_err(|_| Error::LockFailed { path: path.clone() })?;
        tracing::debug!(path = %path.display(), "Acquired directory lock");

        Ok(Self { file, path })
    }

    /// Try to take the lock without blocking.
    ///
    /// Returns `Ok(None)` when another holder owns it.
    pub fn try_acquire(dir: &Path) -> Result<Option<Self>> {
        let (file, path) = open_lock_file(dir)?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(_) => Ok(None),
        }
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_lock_file(dir: &Path) -> Result<(File, PathBuf)> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let path = dir.join(FlavorPath::CacheLock);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| Error::io(&path, e))?;
    Ok((file, path))
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release directory lock");
        }
    }
}
