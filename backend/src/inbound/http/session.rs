//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: remembering the authenticated identity and
//! queueing flash messages for the next page.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, IdentityId};

use super::flash::FlashMessage;

pub(crate) const IDENTITY_ID_KEY: &str = "identity_id";
pub(crate) const FLASH_KEY: &str = "flash";
pub(crate) const LOGIN_REQUIRED_MESSAGE: &str = "login required";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Authenticate the session as `identity_id`.
    ///
    /// The session is renewed first so a pre-login cookie cannot be replayed
    /// as the authenticated one.
    pub fn persist_identity(&self, identity_id: IdentityId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(IDENTITY_ID_KEY, identity_id.get())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the authenticated identity id, if present.
    ///
    /// A value that no longer decodes is treated as an anonymous session.
    pub fn identity_id(&self) -> Result<Option<IdentityId>, Error> {
        match self.0.get::<i64>(IDENTITY_ID_KEY) {
            Ok(id) => Ok(id.map(IdentityId::new)),
            Err(error) => {
                warn!("invalid identity id in session cookie: {error}");
                Ok(None)
            }
        }
    }

    /// Require an authenticated identity id or return `401 Unauthorized`.
    pub fn require_identity_id(&self) -> Result<IdentityId, Error> {
        self.identity_id()?
            .ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED_MESSAGE))
    }

    /// Drop every session value and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Queue a flash message for the next page.
    pub fn push_flash(&self, flash: FlashMessage) -> Result<(), Error> {
        let mut pending = self.pending_flashes();
        pending.push(flash);
        self.0
            .insert(FLASH_KEY, pending)
            .map_err(|error| Error::internal(format!("failed to store flash message: {error}")))
    }

    /// Remove and return every queued flash message.
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        let pending = self.pending_flashes();
        self.0.remove(FLASH_KEY);
        pending
    }

    fn pending_flashes(&self) -> Vec<FlashMessage> {
        self.0
            .get::<Vec<FlashMessage>>(FLASH_KEY)
            .unwrap_or_else(|error| {
                warn!("discarding unreadable flash messages: {error}");
                None
            })
            .unwrap_or_default()
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
