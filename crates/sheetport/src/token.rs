//! Uniqueness tokens for server-side artifact names

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use sha1::{Digest, Sha1};

/// Generate a collision-resistant uniqueness suffix.
///
/// The token disambiguates the server-side filename from the
/// client-visible one; it has no lifecycle beyond filename composition.
/// Current time plus ten random values, hashed.
pub fn make_token() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let mut parts: Vec<String> = Vec::with_capacity(11);
    parts.push(format!("{}.{:09}", now.as_secs(), now.subsec_nanos()));
    for _ in 0..10 {
        parts.push(rng.gen::<u64>().to_string());
    }

    let digest = Sha1::digest(parts.join("--").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = make_token();
        assert_eq!(token.len(), 40); // SHA-1 hex
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_do_not_collide() {
        let a = make_token();
        let b = make_token();
        assert_ne!(a, b);
    }
}
