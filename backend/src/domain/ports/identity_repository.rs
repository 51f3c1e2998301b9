//! Driven port for identities and the role profile created alongside them.

use async_trait::async_trait;

use crate::domain::{
    Caller, EmailAddress, IdentityId, NewIdentity, NewProfile, Role, StoredCredentials, Username,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by identity repository adapters.
    pub enum IdentityRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "identity repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "identity repository query failed: {message}",
        /// Another identity already uses the email address.
        DuplicateEmail => "email address is already registered",
        /// Another identity already uses the username.
        DuplicateUsername => "username is already taken",
    }
}

/// Identity and role produced by a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredIdentity {
    pub identity_id: IdentityId,
    pub role: Role,
}

/// Port for identity persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Whether any identity uses `email`.
    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, IdentityRepositoryError>;

    /// Whether any identity uses `username`.
    async fn username_taken(&self, username: &Username) -> Result<bool, IdentityRepositoryError>;

    /// Insert an identity and its profile as one atomic unit.
    ///
    /// Implementations must not leave an identity without its profile when
    /// the profile insert fails. Unique violations surface as
    /// [`IdentityRepositoryError::DuplicateEmail`] or
    /// [`IdentityRepositoryError::DuplicateUsername`].
    async fn register(
        &self,
        identity: NewIdentity,
        profile: NewProfile,
    ) -> Result<RegisteredIdentity, IdentityRepositoryError>;

    /// Insert an identity with no profile.
    async fn create_staff(&self, identity: NewIdentity)
    -> Result<IdentityId, IdentityRepositoryError>;

    /// Credentials for the identity called `username`, if any.
    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError>;

    /// Identity and role for `id`, if it still exists.
    async fn find_caller(&self, id: IdentityId) -> Result<Option<Caller>, IdentityRepositoryError>;
}
