use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, Params, Version};

use crate::errors::CredentialError;

/// Default cost parameters: memory 19 MiB, 2 iterations, 1 lane — the
/// OWASP-recommended Argon2id baseline, comparable to a bcrypt work factor
/// of 10+ in wall-clock terms. Callers that need a different cost (e.g.
/// faster hashing in tests) use `hash_password_with_params`.
fn default_params() -> Params {
    Params::new(19 * 1024, 2, 1, None).expect("static Argon2 params are always valid")
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    hash_password_with_params(password, default_params())
}

pub fn hash_password_with_params(password: &str, params: Params) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::HashingBackend(e.to_string()))
}

pub fn verify_password(password: &str, digest: &str) -> Result<(), CredentialError> {
    let parsed = PasswordHash::new(digest).map_err(|_| CredentialError::Invalid)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| CredentialError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_password() {
        let digest = hash_password("Abcd1234!").unwrap();
        assert!(verify_password("Abcd1234!", &digest).is_ok());
        assert!(verify_password("wrong", &digest).is_err());
    }

    #[test]
    fn distinct_hashes_for_the_same_password() {
        let a = hash_password("Abcd1234!").unwrap();
        let b = hash_password("Abcd1234!").unwrap();
        assert_ne!(a, b, "salts must differ between hashes");
    }
}
