//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AppointmentCommand, AppointmentQuery, CallerQuery, DirectoryQuery, LoginService,
    RegistrationCommand,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use clinic::domain::{
///     AppointmentService, DirectoryService, IdentityService, RegistrationService,
/// };
/// use clinic::inbound::http::state::HttpState;
/// use clinic::outbound::memory::InMemoryClinicStore;
/// use clinic::outbound::security::Argon2Hasher;
/// use mockable::DefaultClock;
///
/// let store = Arc::new(InMemoryClinicStore::new(Arc::new(DefaultClock)));
/// let hasher = Arc::new(Argon2Hasher::new());
/// let identities = Arc::new(IdentityService::new(store.clone(), hasher.clone()));
/// let appointments = Arc::new(AppointmentService::new(
///     store.clone(),
///     store.clone(),
///     store.clone(),
/// ));
/// let state = HttpState {
///     login: identities.clone(),
///     callers: identities,
///     registration: Arc::new(RegistrationService::new(
///         store.clone(),
///         hasher,
///         Arc::new(DefaultClock),
///     )),
///     appointments: appointments.clone(),
///     appointments_query: appointments,
///     directory: Arc::new(DirectoryService::new(store.clone(), store)),
/// };
/// let _login = state.login.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub callers: Arc<dyn CallerQuery>,
    pub registration: Arc<dyn RegistrationCommand>,
    pub appointments: Arc<dyn AppointmentCommand>,
    pub appointments_query: Arc<dyn AppointmentQuery>,
    pub directory: Arc<dyn DirectoryQuery>,
}
