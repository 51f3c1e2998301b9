//! In-process clinic harness for end-to-end HTTP scenarios.
//!
//! Every scenario gets a fresh in-memory store wired through the real
//! services, so flows run exactly as they do in a database-less server.
//! Each [`Visitor`] carries its own session cookie, letting one scenario
//! drive several accounts against the same app.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use serde_json::Value;

use clinic::Trace;
use clinic::domain::{AppointmentService, DirectoryService, IdentityService, RegistrationService};
use clinic::inbound::http::configure;
use clinic::inbound::http::state::HttpState;
use clinic::outbound::memory::InMemoryClinicStore;
use clinic::outbound::security::Argon2Hasher;

/// Response fields scenarios assert on.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl Reply {
    /// Messages reported for `field` in a validation error body.
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        self.body["details"]["fields"]
            .as_array()
            .into_iter()
            .flatten()
            .filter(|entry| entry["field"] == field)
            .filter_map(|entry| entry["message"].as_str().map(str::to_owned))
            .collect()
    }
}

/// A browser: remembers the last session cookie it was given.
#[derive(Debug, Default)]
pub struct Visitor {
    cookie: Option<Cookie<'static>>,
}

/// Store plus the real services behind an in-memory app.
pub struct Clinic {
    pub store: Arc<InMemoryClinicStore>,
    state: web::Data<HttpState>,
    key: Key,
}

impl Clinic {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryClinicStore::new(Arc::new(DefaultClock)));
        let hasher = Arc::new(Argon2Hasher::new());
        let identities = Arc::new(IdentityService::new(store.clone(), hasher.clone()));
        let appointments = Arc::new(AppointmentService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let state = HttpState {
            login: identities.clone(),
            callers: identities,
            registration: Arc::new(RegistrationService::new(
                store.clone(),
                hasher,
                Arc::new(DefaultClock),
            )),
            appointments: appointments.clone(),
            appointments_query: appointments,
            directory: Arc::new(DirectoryService::new(store.clone(), store.clone())),
        };
        Self {
            store,
            state: web::Data::new(state),
            key: Key::generate(),
        }
    }

    /// Initialise the full route table behind test session settings.
    pub async fn app(
        &self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
    {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        actix_test::init_service(
            App::new()
                .app_data(self.state.clone())
                .wrap(session)
                .wrap(Trace)
                .configure(configure),
        )
        .await
    }
}

impl Default for Clinic {
    fn default() -> Self {
        Self::new()
    }
}

async fn send<S>(app: &S, visitor: &mut Visitor, request: actix_test::TestRequest) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = match visitor.cookie.clone() {
        Some(cookie) => request.cookie(cookie),
        None => request,
    };
    let response = actix_test::call_service(app, request.to_request()).await;
    if let Some(cookie) = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
    {
        visitor.cookie = Some(cookie.into_owned());
    }
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = actix_test::read_body(response).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        location,
        body,
    }
}

/// `GET path` as `visitor`.
pub async fn get<S>(app: &S, visitor: &mut Visitor, path: &str) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    send(app, visitor, actix_test::TestRequest::get().uri(path)).await
}

/// `POST path` with an url-encoded form as `visitor`.
pub async fn post_form<S>(
    app: &S,
    visitor: &mut Visitor,
    path: &str,
    form: &[(&str, &str)],
) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    send(
        app,
        visitor,
        actix_test::TestRequest::post().uri(path).set_form(form),
    )
    .await
}

/// Patient registration form for `username` with matching passwords.
pub fn patient_form<'a>(username: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("username", username),
        ("first_name", "Alice"),
        ("last_name", "Smith"),
        ("email", email),
        ("password", "pw123"),
        ("confirm_password", "pw123"),
        ("date_of_birth", "1990-01-01"),
        ("blood_type", "O+"),
        ("phone", "555-1111"),
    ]
}

/// Doctor registration form for `username`.
pub fn doctor_form<'a>(
    username: &'a str,
    email: &'a str,
    last_name: &'a str,
    specialization: &'a str,
) -> Vec<(&'a str, &'a str)> {
    vec![
        ("username", username),
        ("first_name", "Greg"),
        ("last_name", last_name),
        ("email", email),
        ("password", "pw123"),
        ("confirm_password", "pw123"),
        ("specialization", specialization),
        ("phone", "555-2222"),
    ]
}
