//! Credential hashing.
//!
//! Passwords are stored as Argon2 PHC strings and compared through the
//! library verifier, which is constant-time over the hash output. Plain
//! string equality against a stored credential is never performed.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hash a plaintext credential into a self-describing PHC string.
///
/// # Errors
/// Returns an error if the hasher rejects its inputs.
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext credential against a stored PHC string.
///
/// Unparseable stored hashes count as a mismatch rather than an error; a
/// corrupted row must not let a caller through.
#[must_use]
pub fn verify_password(plain: &str, phc: &str) -> bool {
    PasswordHash::new(phc).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    })
}
