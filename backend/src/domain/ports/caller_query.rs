//! Driving port resolving a session's identity id into a caller.

use async_trait::async_trait;

use crate::domain::{Caller, Error, IdentityId};

/// Domain use-case port for caller resolution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallerQuery: Send + Sync {
    /// Caller for `id`; `None` when the identity no longer exists.
    async fn caller(&self, id: IdentityId) -> Result<Option<Caller>, Error>;
}
