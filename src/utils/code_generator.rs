//! Deterministic short code generation.
//!
//! Codes are derived from the row id and a service-wide secret, so the same
//! link always maps to the same code and no collision-retry loop is needed.

use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Number of digest bytes kept before base64 encoding.
///
/// Six bytes yield an 8-character code and a 2^48 code space, far beyond any
/// realistic row count for this service.
const CODE_DIGEST_BYTES: usize = 6;

/// Generates the short code for a link id.
///
/// Hashes `"{secret}:{id}"` with SHA-256 and encodes the first six digest
/// bytes as URL-safe base64 without padding, producing an 8-character code.
/// The secret keeps the id sequence from being enumerable from codes alone.
///
/// # Examples
///
/// ```
/// use linkward::utils::code_generator::generate_code;
///
/// let code = generate_code("secret", 42);
/// assert_eq!(code.len(), 8);
/// assert_eq!(code, generate_code("secret", 42));
/// ```
pub fn generate_code(secret: &str, id: i64) -> String {
    let digest = Sha256::digest(format!("{secret}:{id}"));

    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&digest[..CODE_DIGEST_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_code_is_deterministic() {
        let first = generate_code("secret", 1);
        let second = generate_code("secret", 1);

        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_code_has_correct_length() {
        let code = generate_code("secret", 12345);
        assert_eq!(code.len(), 8);
    }

    #[test]
    fn test_generate_code_url_safe_characters() {
        for id in 0..100 {
            let code = generate_code("secret", id);
            assert!(
                code.chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || c == '_'),
                "code '{}' contains a non-URL-safe character",
                code
            );
        }
    }

    #[test]
    fn test_generate_code_no_padding() {
        let code = generate_code("secret", 7);
        assert!(!code.contains('='));
    }

    #[test]
    fn test_distinct_ids_produce_distinct_codes() {
        let mut codes = HashSet::new();

        for id in 0..1000 {
            codes.insert(generate_code("secret", id));
        }

        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_distinct_secrets_produce_distinct_codes() {
        let a = generate_code("secret-a", 1);
        let b = generate_code("secret-b", 1);

        assert_ne!(a, b);
    }

    #[test]
    fn test_negative_and_zero_ids_are_valid_inputs() {
        let zero = generate_code("secret", 0);
        let negative = generate_code("secret", -1);

        assert_eq!(zero.len(), 8);
        assert_eq!(negative.len(), 8);
        assert_ne!(zero, negative);
    }
}
