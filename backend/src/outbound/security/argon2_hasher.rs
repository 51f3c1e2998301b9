//! Argon2id implementation of [`CredentialHasher`].
//!
//! Hashes are stored in PHC string format, so parameters and salt travel
//! with the hash and verification needs no extra configuration.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as PhcError, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString,
};

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Salted Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Hasher using Argon2id v19 with default cost parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordHash::new(hash.to_string()))
            .map_err(|err| CredentialHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, CredentialHasherError> {
        let parsed = PhcHash::new(hash.as_ref())
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(err) => Err(CredentialHasherError::malformed_hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new()
    }

    #[rstest]
    fn verifies_the_plain_password(hasher: Argon2Hasher) {
        let hash = hasher.hash("correct horse").expect("hash");
        assert!(hash.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Argon2Hasher) {
        let first = hasher.hash("secret").expect("hash");
        let second = hasher.hash("secret").expect("hash");
        assert_ne!(first.as_ref(), second.as_ref());
    }

    #[rstest]
    fn malformed_hashes_are_errors(hasher: Argon2Hasher) {
        let err = hasher
            .verify("secret", &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");
        assert!(matches!(err, CredentialHasherError::MalformedHash { .. }));
    }
}
