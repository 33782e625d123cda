//! SHA-256 digests used to disambiguate directory names

use sha2::{Digest, Sha256};

/// Number of hex characters kept from a location digest
const SHORT_DIGEST_LEN: usize = 12;

/// Compute a short, stable digest of a repository location.
///
/// Returns the first twelve lowercase hex characters of the SHA-256 of the
/// location text.
pub fn location_digest(location: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(location.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(SHORT_DIGEST_LEN);
    hex
}
