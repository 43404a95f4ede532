use sha2::{Digest, Sha256};

/// SHA-256 of an in-memory buffer, lower-case hex.
///
/// Written next to the canonical output so a normalized set can be traced
/// back to the exact bytes it came from.
pub fn bytes_fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_has_known_digest() {
        assert_eq!(
            bytes_fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
