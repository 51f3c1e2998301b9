//! Driven port for password hashing.
//!
//! Hashing is CPU-bound and synchronous, so the trait is not async.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// The password could not be hashed.
        Hash { message } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message } => "stored password hash is malformed: {message}",
    }
}

/// Port for salted password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Whether `password` matches `hash`.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, CredentialHasherError>;
}
