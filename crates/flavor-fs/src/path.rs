//! Normalized path handling and directory-name sanitising

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Vim accepts forward slashes on every platform, so paths that end up in
/// generated Vim script are rendered through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and drops a trailing slash.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let mut normalized = path_str.replace('\\', "/");
        while normalized.len() > 1 && normalized.ends_with('/') {
            normalized.pop();
        }
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Turn arbitrary text into a single safe directory name.
///
/// Every character outside `[A-Za-z0-9._-]` becomes `_`, so
/// `kana/vim-smartinput` maps to `kana_vim-smartinput` and a repository URI
/// maps to a flat cache directory name. The mapping is pure.
pub fn zap(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// [`zap`] `text` into a name usable as one visible directory entry.
///
/// A leading `.` becomes `_`, so the result is never `.`, `..` or a hidden
/// name. Empty text maps to `_`.
pub fn zap_dir_name(text: &str) -> String {
    let zapped = zap(text);
    match zapped.strip_prefix('.') {
        Some(rest) => format!("_{rest}"),
        None if zapped.is_empty() => "_".to_string(),
        None => zapped,
    }
}
