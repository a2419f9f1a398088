//! Hashing utilities for deriving stable identifiers.

use sha2::{Digest, Sha256};

/// Hash several components into one digest, separated by NUL bytes.
pub fn sha256_parts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_parts_known_digest() {
        // SHA-256 of a single NUL byte
        assert_eq!(
            sha256_parts([""]),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
    }

    #[test]
    fn test_sha256_parts_separates_components() {
        let a = sha256_parts(["ab", "c"]);
        let b = sha256_parts(["a", "bc"]);
        assert_ne!(a, b);
        assert_eq!(a, sha256_parts(["ab", "c"]));
    }
}
