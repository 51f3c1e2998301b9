//! OpenAPI document for the HTTP surface.
//!
//! Served through Swagger UI at `/docs` in debug builds and printed by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::appointments::{
    AppointmentEditPage, AppointmentFormBody, AppointmentListResponse, AppointmentResponse,
};
use crate::inbound::http::auth::{CallerResponse, LoginForm, LoginPage};
use crate::inbound::http::directory::{
    DoctorListResponse, DoctorResponse, PatientListResponse, PatientResponse,
};
use crate::inbound::http::flash::{FlashLevel, FlashMessage};
use crate::inbound::http::forms::{ChoiceOption, FieldChoices, FormDescriptor};
use crate::inbound::http::home::{Action, HomeResponse};
use crate::inbound::http::registration::{DoctorRegistrationForm, PatientRegistrationForm};

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login/ or a successful registration.",
            ))),
        );
    }
}

/// OpenAPI document for the clinic API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic scheduling API",
        description = "Registration, session login, directories and appointment booking."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::home::home,
        crate::inbound::http::auth::login_form,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_identity,
        crate::inbound::http::registration::patient_form,
        crate::inbound::http::registration::register_patient,
        crate::inbound::http::registration::doctor_form,
        crate::inbound::http::registration::register_doctor,
        crate::inbound::http::directory::list_patients,
        crate::inbound::http::directory::list_doctors,
        crate::inbound::http::appointments::list_appointments,
        crate::inbound::http::appointments::add_appointment_form,
        crate::inbound::http::appointments::add_appointment,
        crate::inbound::http::appointments::edit_appointment_form,
        crate::inbound::http::appointments::edit_appointment,
        crate::inbound::http::appointments::cancel_appointment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FlashLevel,
        FlashMessage,
        ChoiceOption,
        FieldChoices,
        FormDescriptor,
        Action,
        HomeResponse,
        CallerResponse,
        LoginForm,
        LoginPage,
        PatientRegistrationForm,
        DoctorRegistrationForm,
        PatientResponse,
        PatientListResponse,
        DoctorResponse,
        DoctorListResponse,
        AppointmentFormBody,
        AppointmentResponse,
        AppointmentListResponse,
        AppointmentEditPage,
    )),
    tags(
        (name = "pages", description = "Landing payload"),
        (name = "auth", description = "Session login and logout"),
        (name = "registration", description = "Patient and doctor sign-up"),
        (name = "directory", description = "Patient and doctor listings"),
        (name = "appointments", description = "Booking, editing and cancelling"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
