//! Login, logout and current-identity handlers.
//!
//! ```text
//! GET  /login/
//! POST /login/   username=alice&password=pw123
//! POST /logout/
//! GET  /me/
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::{Caller, Error, LoginCredentials, Role};

use super::ApiResult;
use super::forms::FormDescriptor;
use super::navigation::{HOME_PATH, current_caller, safe_next, see_other};
use super::session::{LOGIN_REQUIRED_MESSAGE, SessionContext};
use super::state::HttpState;

/// Login form body for `POST /login/`.
///
/// No `Debug` impl: the body carries a plain-text password.
#[derive(Default, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "pw123")]
    pub password: Option<String>,
    /// Local path to continue to after login.
    #[schema(example = "/appointments/")]
    pub next: Option<String>,
}

/// Query string of `GET /login/`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginQuery {
    /// Local path a protected page asked to return to.
    pub next: Option<String>,
}

/// Payload of `GET /login/` for anonymous visitors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginPage {
    pub form: FormDescriptor,
    /// Path the form will continue to.
    pub next: Option<String>,
}

/// Authenticated identity as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallerResponse {
    pub identity_id: i64,
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@x.com")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Greeting name; doctors carry the `Dr.` prefix.
    #[schema(example = "Dr. Gregory House")]
    pub display_name: String,
    /// `patient`, `doctor` or `staff`.
    #[schema(example = "patient")]
    pub role: String,
    /// Patient or doctor profile id; absent for staff.
    pub profile_id: Option<i64>,
}

impl From<&Caller> for CallerResponse {
    fn from(caller: &Caller) -> Self {
        let profile_id = match caller.role {
            Role::Patient(id) => Some(id.get()),
            Role::Doctor(id) => Some(id.get()),
            Role::Staff => None,
        };
        Self {
            identity_id: caller.identity.id.get(),
            username: caller.identity.username.to_string(),
            email: caller.identity.email.to_string(),
            first_name: caller.identity.first_name.to_string(),
            last_name: caller.identity.last_name.to_string(),
            display_name: caller.display_name(),
            role: caller.role.label().to_owned(),
            profile_id,
        }
    }
}

/// Show the login form, or send signed-in callers home.
#[utoipa::path(
    get,
    path = "/login/",
    params(("next" = Option<String>, Query, description = "Local path to continue to")),
    responses(
        (status = 200, description = "Login form", body = LoginPage),
        (status = 303, description = "Already signed in; redirect home")
    ),
    tags = ["auth"],
    operation_id = "loginForm",
    security([])
)]
#[get("/login/")]
pub async fn login_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LoginQuery>,
) -> ApiResult<HttpResponse> {
    if current_caller(&state, &session).await?.is_some() {
        return Ok(see_other(HOME_PATH));
    }
    Ok(HttpResponse::Ok().json(LoginPage {
        form: FormDescriptor::new(["username", "password"]),
        next: safe_next(query.next.as_deref()).map(str::to_owned),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/login/",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (
            status = 303,
            description = "Signed in",
            headers(("Set-Cookie" = String, description = "Session cookie"))
        ),
        (status = 400, description = "Missing username or password", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        form.username.as_deref().unwrap_or_default(),
        form.password.as_deref().unwrap_or_default(),
    )?;
    let identity_id = state.login.authenticate(&credentials).await?;
    session.persist_identity(identity_id)?;
    info!(%identity_id, "signed in");
    Ok(see_other(
        safe_next(form.next.as_deref()).unwrap_or(HOME_PATH),
    ))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/logout/",
    responses((status = 303, description = "Signed out; redirect home")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout/")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    see_other(HOME_PATH)
}

/// The signed-in identity with its role.
#[utoipa::path(
    get,
    path = "/me/",
    responses(
        (status = 200, description = "Current identity", body = CallerResponse),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentIdentity"
)]
#[get("/me/")]
pub async fn current_identity(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CallerResponse>> {
    let identity_id = session.require_identity_id()?;
    let Some(caller) = state.callers.caller(identity_id).await? else {
        warn!(%identity_id, "session refers to a missing identity; purging");
        session.purge();
        return Err(Error::unauthorized(LOGIN_REQUIRED_MESSAGE));
    };
    Ok(web::Json(CallerResponse::from(&caller)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAppointmentCommand, MockAppointmentQuery, MockCallerQuery, MockDirectoryQuery,
        MockLoginService, MockRegistrationCommand,
    };
    use crate::domain::{
        EmailAddress, ErrorCode, Identity, IdentityId, PatientId, PersonName, Username,
    };
    use crate::inbound::http::test_utils::{location, session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use std::sync::Arc;

    fn caller() -> Caller {
        Caller {
            identity: Identity {
                id: IdentityId::new(7),
                username: Username::new("alice").expect("username"),
                email: EmailAddress::new("alice@x.com").expect("email"),
                first_name: PersonName::new("Alice").expect("first"),
                last_name: PersonName::new("Smith").expect("last"),
                created_at: Utc
                    .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                    .single()
                    .expect("timestamp"),
            },
            role: Role::Patient(PatientId::new(3)),
        }
    }

    fn state(login_service: MockLoginService, callers: MockCallerQuery) -> HttpState {
        HttpState {
            login: Arc::new(login_service),
            callers: Arc::new(callers),
            registration: Arc::new(MockRegistrationCommand::new()),
            appointments: Arc::new(MockAppointmentCommand::new()),
            appointments_query: Arc::new(MockAppointmentQuery::new()),
            directory: Arc::new(MockDirectoryQuery::new()),
        }
    }

    fn accepting_login() -> MockLoginService {
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .withf(|credentials| {
                credentials.username() == "alice" && credentials.password() == "pw123"
            })
            .returning(|_| Ok(IdentityId::new(7)));
        login_service
            .expect_authenticate()
            .returning(|_| Err(Error::unauthorized("invalid credentials")));
        login_service
    }

    fn known_caller() -> MockCallerQuery {
        let mut callers = MockCallerQuery::new();
        callers
            .expect_caller()
            .returning(|id| Ok((id == IdentityId::new(7)).then(caller)));
        callers
    }

    fn app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(login_form)
            .service(login)
            .service(logout)
            .service(current_identity)
    }

    #[rstest]
    #[case("username=&password=pw123", "username")]
    #[case("username=alice&password=", "password")]
    #[actix_web::test]
    async fn blank_fields_are_rejected(#[case] body: &str, #[case] field: &str) {
        let app = actix_test::init_service(app(state(
            MockLoginService::new(),
            MockCallerQuery::new(),
        )))
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/login/")
            .insert_header(("content-type", "application/x-www-form-urlencoded"))
            .set_payload(body.to_owned())
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Error = actix_test::read_body_json(response).await;
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        let fields = error
            .details()
            .and_then(|d| d.get("fields"))
            .and_then(|f| f.as_array())
            .expect("field list");
        assert_eq!(fields[0]["field"], field);
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let app = actix_test::init_service(app(state(accepting_login(), known_caller()))).await;
        let request = actix_test::TestRequest::post()
            .uri("/login/")
            .set_form(LoginForm {
                username: Some("alice".into()),
                password: Some("nope".into()),
                next: None,
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn login_then_me_then_logout() {
        let app = actix_test::init_service(app(state(accepting_login(), known_caller()))).await;

        let request = actix_test::TestRequest::post()
            .uri("/login/")
            .set_form(LoginForm {
                username: Some("alice".into()),
                password: Some("pw123".into()),
                next: Some("/appointments/".into()),
            })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response).as_deref(), Some("/appointments/"));
        let cookie = session_cookie(&response).expect("session cookie");

        let me = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/me/")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(me.status(), StatusCode::OK);
        let body: CallerResponse = actix_test::read_body_json(me).await;
        assert_eq!(body.username, "alice");
        assert_eq!(body.role, "patient");
        assert_eq!(body.profile_id, Some(3));

        let form = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/login/")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(form.status(), StatusCode::SEE_OTHER);

        let out = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/logout/")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(out.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&out).as_deref(), Some("/"));
    }

    #[actix_web::test]
    async fn anonymous_me_is_unauthorised() {
        let visitors = state(MockLoginService::new(), MockCallerQuery::new());
        let app = actix_test::init_service(app(visitors)).await;
        let request = actix_test::TestRequest::get().uri("/me/").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn session_for_a_vanished_identity_is_purged() {
        let mut callers = MockCallerQuery::new();
        callers.expect_caller().times(1).returning(|_| Ok(None));
        let app = actix_test::init_service(app(state(accepting_login(), callers))).await;
        let request = actix_test::TestRequest::post()
            .uri("/login/")
            .set_form(LoginForm {
                username: Some("alice".into()),
                password: Some("pw123".into()),
                next: None,
            })
            .to_request();
        let signed_in = actix_test::call_service(&app, request).await;
        let cookie = session_cookie(&signed_in).expect("session cookie");

        let me = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/me/")
                .cookie(cookie)
                .to_request(),
        )
        .await;

        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
        let removal = session_cookie(&me).expect("session removal cookie");
        assert!(removal.value().is_empty());
        let error: Error = actix_test::read_body_json(me).await;
        assert_eq!(error.message(), LOGIN_REQUIRED_MESSAGE);
    }
}
