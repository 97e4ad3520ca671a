use sha2::{Digest, Sha256};

/// Number of hex characters of a digest that may appear in logs.
pub const HASH_PREFIX_LEN: usize = 8;

/// Hash a raw identifier and return its 8-character log prefix.
pub fn hash_prefix(value: &str) -> String {
    let digest = hex::encode(Sha256::digest(value.as_bytes()));
    truncate_hash(&digest).to_string()
}

/// Shorten an identifier that is already a hex digest.
///
/// Values shorter than the prefix (or not ASCII) are returned unchanged only
/// when they fit; otherwise the first [`HASH_PREFIX_LEN`] characters are kept.
pub fn truncate_hash(hash: &str) -> &str {
    hash.get(..HASH_PREFIX_LEN).unwrap_or(hash)
}
