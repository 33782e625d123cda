//! Bare clones backing the repository cache

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{AutotagOption, FetchOptions, FetchPrune, Repository};

use crate::{Error, Result, extract};

/// Remote name used for every cached clone
const ORIGIN: &str = "origin";

/// Refspec mirroring every upstream tag, moved tags included
const TAGS_REFSPEC: &str = "+refs/tags/*:refs/tags/*";

/// A bare clone of a plugin repository inside the cache.
pub struct CachedRepository {
    path: PathBuf,
    repo: Repository,
}

impl CachedRepository {
    /// Clone `location` as a bare repository at `dest`.
    ///
    /// Parent directories are created as needed.
    pub fn clone_bare(location: &str, dest: &Path) -> Result<Self> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| flavor_fs::Error::io(parent, e))?;
        }

        tracing::debug!(%location, dest = %dest.display(), "Cloning repository");
        let repo = RepoBuilder::new()
            .bare(true)
            .clone(location, dest)
            .map_err(|e| Error::CloneFailed {
                location: location.to_string(),
                message: e.message().to_string(),
            })?;

        Ok(Self {
            path: dest.to_path_buf(),
            repo,
        })
    }

    /// Open an existing bare clone.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open_bare(path).map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    /// Path of the bare clone.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URL of the `origin` remote.
    pub fn origin_url(&self) -> Result<String> {
        let remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|_| Error::RemoteNotFound {
                name: ORIGIN.to_string(),
            })?;
        Ok(remote.url().unwrap_or_default().to_string())
    }

    /// Fetch every tag from `origin`, pruning tags deleted upstream.
    pub fn fetch_tags(&self) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(ORIGIN)
            .map_err(|_| Error::RemoteNotFound {
                name: ORIGIN.to_string(),
            })?;
        let location = remote.url().unwrap_or_default().to_string();

        let mut opts = FetchOptions::new();
        opts.download_tags(AutotagOption::All);
        opts.prune(FetchPrune::On);

        tracing::debug!(%location, "Fetching tags");
        remote
            .fetch(&[TAGS_REFSPEC], Some(&mut opts), None)
            .map_err(|e| Error::FetchFailed {
                location,
                message: e.message().to_string(),
            })?;

        Ok(())
    }

    /// Names of all tags, sorted.
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        let mut tags: Vec<String> = names.iter().flatten().map(String::from).collect();
        tags.sort();
        Ok(tags)
    }

    /// Write the file tree of `tag` into `dest`.
    ///
    /// `dest` is created if missing. Existing files with the same names are
    /// overwritten; nothing else in `dest` is removed.
    pub fn extract_tag(&self, tag: &str, dest: &Path) -> Result<()> {
        let reference = format!("refs/tags/{tag}");
        let object = self
            .repo
            .revparse_single(&reference)
            .map_err(|_| Error::TagNotFound {
                tag: tag.to_string(),
                path: self.path.clone(),
            })?;
        let tree = object.peel_to_tree()?;

        tracing::debug!(%tag, dest = %dest.display(), "Extracting tag");
        std::fs::create_dir_all(dest).map_err(|e| flavor_fs::Error::io(dest, e))?;
        extract::write_tree(&self.repo, &tree, dest)
    }
}
