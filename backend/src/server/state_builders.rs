//! Compose domain services over the configured repository adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use clinic::domain::ports::{
    AppointmentRepository, DoctorRepository, IdentityRepository, PatientRepository,
};
use clinic::domain::{AppointmentService, DirectoryService, IdentityService, RegistrationService};
use clinic::inbound::http::state::HttpState;
use clinic::outbound::memory::InMemoryClinicStore;
use clinic::outbound::persistence::{
    DieselAppointmentRepository, DieselDoctorRepository, DieselIdentityRepository,
    DieselPatientRepository,
};
use clinic::outbound::security::Argon2Hasher;

use super::Storage;

fn http_state_over<I, P, D, A>(
    identities: Arc<I>,
    patients: Arc<P>,
    doctors: Arc<D>,
    appointments: Arc<A>,
) -> HttpState
where
    I: IdentityRepository + 'static,
    P: PatientRepository + 'static,
    D: DoctorRepository + 'static,
    A: AppointmentRepository + 'static,
{
    let hasher = Arc::new(Argon2Hasher::new());
    let identity = Arc::new(IdentityService::new(identities.clone(), hasher.clone()));
    let booking = Arc::new(AppointmentService::new(
        appointments,
        patients.clone(),
        doctors.clone(),
    ));
    HttpState {
        login: identity.clone(),
        callers: identity,
        registration: Arc::new(RegistrationService::new(
            identities,
            hasher,
            Arc::new(DefaultClock),
        )),
        appointments: booking.clone(),
        appointments_query: booking,
        directory: Arc::new(DirectoryService::new(patients, doctors)),
    }
}

/// Services over the repositories `storage` selects.
pub(super) fn build_http_state(storage: &Storage) -> web::Data<HttpState> {
    let state = match storage {
        Storage::Postgres(pool) => http_state_over(
            Arc::new(DieselIdentityRepository::new(pool.clone())),
            Arc::new(DieselPatientRepository::new(pool.clone())),
            Arc::new(DieselDoctorRepository::new(pool.clone())),
            Arc::new(DieselAppointmentRepository::new(pool.clone())),
        ),
        Storage::Memory => {
            warn!("no database configured; records live in memory and vanish on restart");
            let store = Arc::new(InMemoryClinicStore::new(Arc::new(DefaultClock)));
            http_state_over(store.clone(), store.clone(), store.clone(), store)
        }
    };
    web::Data::new(state)
}
