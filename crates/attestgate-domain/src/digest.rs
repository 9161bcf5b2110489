use sha2::{Digest, Sha256};

/// Stable SHA-256 digest of a policy module's source, hex encoded.
///
/// Reports carry it so a decision can be traced to the exact policy text.
pub fn module_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
