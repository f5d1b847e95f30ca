use sha2::{Digest, Sha256};

pub const BAD_TOKEN_MESSAGE: &str = "Bad token in body (token field)";

/// Exact-match check of the caller token against the proxy token.
///
/// Both sides are hashed first so the comparison runs over fixed-length
/// digests and does not short-circuit on the first differing byte.
pub fn authenticate(supplied: Option<&str>, expected: &str) -> bool {
    let Some(supplied) = supplied else {
        return false;
    };
    let a = Sha256::digest(supplied.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_match_only() {
        assert!(authenticate(Some("secret"), "secret"));
        assert!(!authenticate(Some("Secret"), "secret"));
        assert!(!authenticate(Some("secret "), "secret"));
        assert!(!authenticate(Some(""), "secret"));
        assert!(!authenticate(None, "secret"));
    }

    #[test]
    fn empty_expected_token_matches_only_empty() {
        assert!(authenticate(Some(""), ""));
        assert!(!authenticate(Some("x"), ""));
    }
}
