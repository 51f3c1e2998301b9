//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, Storage};

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use clinic::Trace;
use clinic::inbound::http::configure;
use clinic::inbound::http::health::HealthState;
use clinic::inbound::http::session_config::SessionSettings;
use clinic::inbound::http::state::HttpState;

use state_builders::build_http_state;

const SESSION_COOKIE: &str = "session";

/// Private, `HttpOnly` cookie session renewed on every request.
fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
        .build()
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: &SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session_middleware(session))
        .wrap(Trace)
        .configure(configure);

    // Interactive docs are a development aid only.
    #[cfg(debug_assertions)]
    let app = {
        use clinic::ApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    app
}

/// Bind the HTTP server and flag it ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        storage,
    } = config;
    let http_state = build_http_state(&storage);
    let app_health = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(app_health.clone(), http_state.clone(), &session)
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "clinic server bound");
    health_state.mark_ready();
    Ok(server)
}
