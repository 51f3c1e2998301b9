//! Login and caller resolution over the identity store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    CallerQuery, CredentialHasher, CredentialHasherError, IdentityRepository,
    IdentityRepositoryError, LoginService,
};
use crate::domain::{Caller, Error, IdentityId, LoginCredentials, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Identity store use-cases: authentication and caller lookup.
#[derive(Clone)]
pub struct IdentityService<R, H> {
    identities: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> IdentityService<R, H> {
    /// Create a new service.
    pub const fn new(identities: Arc<R>, hasher: Arc<H>) -> Self {
        Self { identities, hasher }
    }
}

#[async_trait]
impl<R, H> LoginService for IdentityService<R, H>
where
    R: IdentityRepository,
    H: CredentialHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<IdentityId, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let stored = self
            .identities
            .find_credentials(&username)
            .await
            .map_err(map_identity_error)?;
        let Some(stored) = stored else {
            debug!(%username, "login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let password = Zeroizing::new(credentials.password().to_owned());
        let hash = stored.password_hash.clone();
        let verified =
            run_hasher(&self.hasher, move |hasher| hasher.verify(&password, &hash)).await?;
        if !verified {
            debug!(%username, "login with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(identity_id = %stored.identity_id, "login succeeded");
        Ok(stored.identity_id)
    }
}

#[async_trait]
impl<R, H> CallerQuery for IdentityService<R, H>
where
    R: IdentityRepository,
    H: CredentialHasher,
{
    async fn caller(&self, id: IdentityId) -> Result<Option<Caller>, Error> {
        self.identities
            .find_caller(id)
            .await
            .map_err(map_identity_error)
    }
}

pub(crate) fn map_identity_error(err: IdentityRepositoryError) -> Error {
    match err {
        IdentityRepositoryError::Connection { message } => {
            error!(%message, "identity repository unavailable");
            Error::service_unavailable("identity store unavailable")
        }
        IdentityRepositoryError::Query { message } => {
            error!(%message, "identity repository query failed");
            Error::internal(format!("identity query failed: {message}"))
        }
        IdentityRepositoryError::DuplicateEmail => {
            Error::conflict("email address is already registered")
        }
        IdentityRepositoryError::DuplicateUsername => Error::conflict("username is already taken"),
    }
}

/// Run a hasher call on the blocking pool so Argon2 never stalls a worker.
pub(crate) async fn run_hasher<H, T, F>(hasher: &Arc<H>, job: F) -> Result<T, Error>
where
    H: CredentialHasher + 'static,
    T: Send + 'static,
    F: FnOnce(&H) -> Result<T, CredentialHasherError> + Send + 'static,
{
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || job(&hasher))
        .await
        .map_err(|err| {
            error!(error = %err, "credential hashing task failed");
            Error::internal("credential hashing task failed")
        })?
        .map_err(map_hasher_error)
}

pub(crate) fn map_hasher_error(err: CredentialHasherError) -> Error {
    error!(error = %err, "credential hasher failed");
    Error::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCredentialHasher, MockIdentityRepository};
    use crate::domain::{ErrorCode, PasswordHash, StoredCredentials};
    use rstest::rstest;

    fn stored() -> StoredCredentials {
        StoredCredentials {
            identity_id: IdentityId::new(7),
            password_hash: PasswordHash::new("$argon2id$stub"),
        }
    }

    fn service(
        repo: MockIdentityRepository,
        hasher: MockCredentialHasher,
    ) -> IdentityService<MockIdentityRepository, MockCredentialHasher> {
        IdentityService::new(Arc::new(repo), Arc::new(hasher))
    }

    #[tokio::test]
    async fn authenticates_matching_password() {
        let mut repo = MockIdentityRepository::new();
        repo.expect_find_credentials()
            .withf(|username| username.as_ref() == "alice")
            .return_once(|_| Ok(Some(stored())));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_verify()
            .withf(|password, _| password == "pw123")
            .return_once(|_, _| Ok(true));

        let creds = LoginCredentials::try_from_parts("alice", "pw123").expect("creds");
        let id = service(repo, hasher)
            .authenticate(&creds)
            .await
            .expect("login succeeds");
        assert_eq!(id, IdentityId::new(7));
    }

    #[rstest]
    #[case(Some(stored()), false)]
    #[case(None, true)]
    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorised(
        #[case] found: Option<StoredCredentials>,
        #[case] unknown_user: bool,
    ) {
        let mut repo = MockIdentityRepository::new();
        repo.expect_find_credentials()
            .return_once(move |_| Ok(found));
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_verify()
            .times(usize::from(!unknown_user))
            .returning(|_, _| Ok(false));

        let creds = LoginCredentials::try_from_parts("alice", "nope").expect("creds");
        let err = service(repo, hasher)
            .authenticate(&creds)
            .await
            .expect_err("login fails");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn verification_runs_off_the_calling_thread() {
        let caller_thread = std::thread::current().id();
        let mut repo = MockIdentityRepository::new();
        repo.expect_find_credentials()
            .return_once(|_| Ok(Some(stored())));
        let mut hasher = MockCredentialHasher::new();
        hasher.expect_verify().return_once(move |_, _| {
            assert_ne!(std::thread::current().id(), caller_thread);
            Ok(true)
        });

        let creds = LoginCredentials::try_from_parts("alice", "pw123").expect("creds");
        let id = service(repo, hasher)
            .authenticate(&creds)
            .await
            .expect("login succeeds");
        assert_eq!(id, IdentityId::new(7));
    }

    #[tokio::test]
    async fn panicking_hasher_is_an_internal_error() {
        let mut hasher = MockCredentialHasher::new();
        hasher
            .expect_hash()
            .return_once(|_| panic!("argon2 exploded"));

        let err = run_hasher(&Arc::new(hasher), |hasher| hasher.hash("pw123"))
            .await
            .expect_err("join failure surfaces");
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "credential hashing task failed");
    }

    #[tokio::test]
    async fn malformed_username_never_reaches_repository() {
        let mut repo = MockIdentityRepository::new();
        repo.expect_find_credentials().times(0);
        let creds = LoginCredentials::try_from_parts("bad name", "pw").expect("creds");
        let err = service(repo, MockCredentialHasher::new())
            .authenticate(&creds)
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case(IdentityRepositoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(IdentityRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(IdentityRepositoryError::duplicate_email(), ErrorCode::Conflict)]
    fn repository_errors_map_to_domain_codes(
        #[case] err: IdentityRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_identity_error(err).code(), expected);
    }
}
