use anyhow::Result;

/// Minimum length enforced on new passwords.
pub const MIN_PASSWORD_LEN: usize = 6;

const BCRYPT_COST: u32 = 10;

/// Hash a password for storage.
pub fn hash_password(raw: &str) -> Result<String> {
    bcrypt::hash(raw, BCRYPT_COST).map_err(Into::into)
}

/// Check a password against a stored hash. A malformed hash counts as a
/// mismatch rather than an error so login failures stay uniform.
pub fn verify_password(raw: &str, hash: &str) -> bool {
    bcrypt::verify(raw, hash).unwrap_or(false)
}
