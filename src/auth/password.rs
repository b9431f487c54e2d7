//! Password Hashing
//! Mission: One-way hashing and constant-time verification of credentials

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with an embedded random salt.
///
/// Two calls with the same plaintext produce different hashes; both verify.
pub fn hash_password(plain: &str) -> Result<String> {
    hash(plain, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false for a mismatch or an undecodable hash, never an error.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    verify(plain, hashed).unwrap_or(false)
}
