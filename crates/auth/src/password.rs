//! Salted password hashing for the shared owner password.
//!
//! Stored format: `sha256$<salt-b64>$<digest-b64>`. Verification recomputes
//! the salted digest and compares in constant time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use constant_time_eq::constant_time_eq;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = salted_digest(&salt, password);
    format!(
        "{SCHEME}${}${}",
        BASE64.encode(salt),
        BASE64.encode(digest)
    )
}

/// Check a candidate password against a stored hash.
///
/// Malformed stored hashes verify as false rather than erroring; a bad hash
/// in config must never open the door.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt_b64), Some(digest_b64)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt_b64), BASE64.decode(digest_b64)) else {
        return false;
    };

    let actual = salted_digest(&salt, password);
    constant_time_eq(&actual, &expected)
}

fn salted_digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let stored = hash_password("Omoadu07.");
        assert!(verify_password("Omoadu07.", &stored));
        assert!(!verify_password("omoadu07.", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("hunter2");
        let b = hash_password("hunter2");
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a));
        assert!(verify_password("hunter2", &b));
    }

    #[test]
    fn malformed_stored_hashes_never_verify() {
        for bad in ["", "sha256", "sha256$x", "md5$a$b", "sha256$!!$!!"] {
            assert!(!verify_password("anything", bad));
        }
    }
}
