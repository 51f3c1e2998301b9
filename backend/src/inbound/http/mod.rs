//! HTTP inbound adapter.
//!
//! Handlers parse form bodies, resolve the session's caller and call the
//! driving ports held in [`state::HttpState`]. Page-style flows answer
//! successful posts with `303 See Other`; everything else is JSON.

use actix_web::web;

pub mod appointments;
pub mod auth;
pub mod directory;
pub mod error;
pub mod flash;
pub mod forms;
pub mod health;
pub mod home;
pub mod navigation;
pub mod registration;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register every application route.
///
/// Expects `web::Data<HttpState>` and `web::Data<HealthState>` as app data and
/// a session middleware around the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_identity)
        .service(registration::patient_form)
        .service(registration::register_patient)
        .service(registration::doctor_form)
        .service(registration::register_doctor)
        .service(directory::list_patients)
        .service(directory::list_doctors)
        .service(appointments::list_appointments)
        .service(appointments::add_appointment_form)
        .service(appointments::add_appointment)
        .service(appointments::edit_appointment_form)
        .service(appointments::edit_appointment)
        .service(appointments::cancel_appointment)
        .service(health::ready)
        .service(health::live);
}
