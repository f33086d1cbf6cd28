//! Password hashing via Argon2id.
//!
//! Salts are 8 random bytes drawn per user; both salt and digest are
//! hex-encoded before storage. Verification recomputes the digest and
//! compares in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use subtle::ConstantTimeEq;

use super::AuthError;

/// Per-user salt length in bytes.
pub const SALT_LEN: usize = 8;

/// Digest length in bytes (64 hex chars once encoded).
const HASH_LEN: usize = 32;

/// Argon2id memory cost: 64 MiB.
const MEMORY_COST_KIB: u32 = 64 * 1024;

/// Argon2id time cost (iterations).
const TIME_COST: u32 = 1;

/// Argon2id lanes.
const PARALLELISM: u32 = 4;

fn kdf() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(HASH_LEN))
        .map_err(|e| AuthError::Crypto(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Draw a fresh random salt from the OS entropy source.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Hash a plaintext password with the given salt, returning the
/// hex-encoded digest. Deterministic for a fixed (plain, salt) pair.
pub fn hash_password(plain: &str, salt: &[u8]) -> Result<String, AuthError> {
    let mut out = [0u8; HASH_LEN];
    kdf()?
        .hash_password_into(plain.as_bytes(), salt, &mut out)
        .map_err(|e| AuthError::Crypto(format!("argon2 hash: {e}")))?;
    Ok(hex::encode(out))
}

/// Verify a plaintext password against a stored hex salt and hex digest.
pub fn verify_password(
    plain: &str,
    salt_hex: &str,
    expected_hash_hex: &str,
) -> Result<bool, AuthError> {
    let salt =
        hex::decode(salt_hex).map_err(|e| AuthError::Crypto(format!("salt decode: {e}")))?;
    let computed = hash_password(plain, &salt)?;
    Ok(computed
        .as_bytes()
        .ct_eq(expected_hash_hex.as_bytes())
        .into())
}
