//! Password hashing and session token generation.
//!
//! Stored hashes have the form `<salt>$<hash>`, both URL-safe base64 without
//! padding. The hash is BLAKE3 in derive-key mode over `salt || password`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use subtle::ConstantTimeEq;

use crate::error::DatabaseError;

const PASSWORD_CONTEXT: &str = "forum 2026-10-19 password hash v1";
const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;

fn random_bytes<const N: usize>() -> Result<[u8; N], DatabaseError> {
    let mut buf = [0u8; N];
    getrandom::fill(&mut buf)
        .map_err(|e| DatabaseError::Other(anyhow::anyhow!("OS randomness unavailable: {e}")))?;
    Ok(buf)
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(PASSWORD_CONTEXT);
    hasher.update(salt);
    hasher.update(password.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if the OS cannot supply randomness.
pub fn hash_password(password: &str) -> Result<String, DatabaseError> {
    let salt = random_bytes::<SALT_BYTES>()?;
    let hash = digest(&salt, password);
    Ok(format!(
        "{}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(hash)
    ))
}

/// Check a password against a stored hash in constant time.
///
/// Malformed stored values never verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (URL_SAFE_NO_PAD.decode(salt), URL_SAFE_NO_PAD.decode(expected))
    else {
        return false;
    };
    let actual = digest(&salt, password);
    expected.len() == actual.len() && bool::from(actual.as_slice().ct_eq(expected.as_slice()))
}

/// Generate an opaque session token.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if the OS cannot supply randomness.
pub fn new_session_token() -> Result<String, DatabaseError> {
    Ok(URL_SAFE_NO_PAD.encode(random_bytes::<TOKEN_BYTES>()?))
}
