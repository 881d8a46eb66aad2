//! Account passwords: Argon2id in PHC string form.
//!
//! The PHC string carries its own salt and cost parameters, so changing the
//! defaults later does not invalidate stored hashes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

type HashError = argon2::password_hash::Error;

/// Well-formed hash no password matches, verified when the account is
/// unknown so that path costs as much as a wrong password.
const UNKNOWN_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$\
    c2VyZW5lLWR1bW15LXNhbHQ$xMqo0B56Th/+nCvJYWp1hP04+Cvyp2Xnyv8NtDvObi8";

pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when `stored` is not a usable hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Spend one verification on a login attempt for an email with no account.
pub fn verify_unknown_account(password: &str) {
    let _ = verify_password(password, UNKNOWN_ACCOUNT_HASH);
}
