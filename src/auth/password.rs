use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Rows written before hashing was introduced (the seeded admin included)
/// hold the password verbatim; anything that is not a PHC string is one of those.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    if !is_hashed(stored) {
        return Ok(password == stored);
    }
    let parsed_hash = PasswordHash::new(stored).map_err(|err| anyhow!(err))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?
        .to_string())
}
