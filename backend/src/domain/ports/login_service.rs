//! Driving port for login.
//!
//! Inbound adapters authenticate credentials through this trait without
//! knowing how identities are stored or how passwords are hashed.

use async_trait::async_trait;

use crate::domain::{Error, IdentityId, LoginCredentials};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated identity id.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// `ErrorCode::Unauthorized`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<IdentityId, Error>;
}
