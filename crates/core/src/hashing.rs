//! Digests for secrets the portal must recognise but never store: refresh
//! tokens and emailed verification codes.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256, 64 characters.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Compare two digests without exiting at the first differing byte.
pub fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_published_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn code_digests_differ_per_code() {
        let a = sha256_hex(b"482913");
        assert_eq!(a.len(), 64);
        assert_ne!(a, sha256_hex(b"482914"));
    }

    #[test]
    fn digest_comparison() {
        let a = sha256_hex(b"482913");
        assert!(digests_match(&a, &sha256_hex(b"482913")));
        assert!(!digests_match(&a, &sha256_hex(b"000000")));
        assert!(!digests_match(&a, &a[..10]));
    }
}
