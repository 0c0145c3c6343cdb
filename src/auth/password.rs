use crate::error::AppError;

/// bcrypt only consumes the first 72 bytes of input. Truncating here, for
/// both hashing and verification, keeps the two sides consistent instead of
/// relying on whatever the library does with overlong input.
const MAX_PASSWORD_BYTES: usize = 72;

fn truncate(plain: &str) -> &str {
    if plain.len() <= MAX_PASSWORD_BYTES {
        return plain;
    }
    let mut end = MAX_PASSWORD_BYTES;
    while !plain.is_char_boundary(end) {
        end -= 1;
    }
    &plain[..end]
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(truncate(plain), bcrypt::DEFAULT_COST)?)
}

/// Verify a password against a stored hash. Any library failure, including a
/// malformed stored hash, reads as a verification failure rather than an
/// error; constant-time comparison is internal to bcrypt.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(truncate(plain), hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verify_round_trip() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn only_first_72_bytes_are_significant() {
        let base = "x".repeat(72);
        let long_a = format!("{base}aaaa");
        let long_b = format!("{base}bbbb");

        let hash = hash_password(&long_a).expect("hash");
        assert!(verify_password(&long_b, &hash));
        assert!(verify_password(&base, &hash));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 24 three-byte chars = 72 bytes; one more would split a char.
        let tricky = "\u{20AC}".repeat(25);
        let hash = hash_password(&tricky).expect("hash");
        assert!(verify_password(&tricky, &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }
}
