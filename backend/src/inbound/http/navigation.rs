//! Redirect targets and caller resolution shared by page handlers.
//!
//! Browser-facing flows answer successful form posts with `303 See Other`.
//! Pages that need a signed-in caller send anonymous visitors to the login
//! page with a `next` parameter pointing back at the requested path.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use tracing::warn;

use crate::domain::Caller;

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Landing page.
pub const HOME_PATH: &str = "/";
/// Login form.
pub const LOGIN_PATH: &str = "/login/";
/// Appointment listing.
pub const APPOINTMENTS_PATH: &str = "/appointments/";

/// `303 See Other` to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect an anonymous visitor to the login form, remembering `next`.
pub fn login_redirect(next: &str) -> HttpResponse {
    match safe_next(Some(next)) {
        Some(next) if next != HOME_PATH => see_other(&format!("{LOGIN_PATH}?next={next}")),
        _ => see_other(LOGIN_PATH),
    }
}

/// `next` when it is a local absolute path, otherwise `None`.
///
/// Rejects scheme-relative (`//host`) and backslash forms so a crafted
/// link cannot bounce a fresh session to another site.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|path| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.chars().any(char::is_control)
    })
}

/// Resolve the session's caller.
///
/// A session naming an identity that no longer exists is purged and treated
/// as anonymous.
pub(crate) async fn current_caller(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Option<Caller>> {
    let Some(identity_id) = session.identity_id()? else {
        return Ok(None);
    };
    let caller = state.callers.caller(identity_id).await?;
    if caller.is_none() {
        warn!(%identity_id, "session refers to a missing identity; purging");
        session.purge();
    }
    Ok(caller)
}

/// The signed-in caller, or the login redirect to answer with instead.
pub(crate) async fn require_caller(
    request: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<Result<Caller, HttpResponse>> {
    Ok(current_caller(state, session)
        .await?
        .ok_or_else(|| login_redirect(request.path())))
}
