//! Patient and doctor sign-up handlers.
//!
//! `GET` returns the form descriptor; `POST` registers the account, signs the
//! new identity in and redirects home. Validation failures come back as one
//! `400` listing every rejected field.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::Error;
use crate::domain::ports::{
    AccountFields, DoctorFields, PatientFields, ProfileFields, RegistrationRequest,
};

use super::ApiResult;
use super::forms::{ACCOUNT_FIELDS, FormDescriptor, blood_type_choices, specialization_choices};
use super::navigation::{HOME_PATH, see_other};
use super::session::SessionContext;
use super::state::HttpState;

/// Form body for `POST /register/patient/`.
#[derive(Default, Deserialize, Serialize, ToSchema)]
pub struct PatientRegistrationForm {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "Alice")]
    pub first_name: Option<String>,
    #[schema(example = "Smith")]
    pub last_name: Option<String>,
    #[schema(example = "alice@x.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    #[schema(example = "1990-01-01")]
    pub date_of_birth: Option<String>,
    #[schema(example = "O+")]
    pub blood_type: Option<String>,
    #[schema(example = "555-1111")]
    pub phone: Option<String>,
}

/// Form body for `POST /register/doctor/`.
#[derive(Default, Deserialize, Serialize, ToSchema)]
pub struct DoctorRegistrationForm {
    #[schema(example = "house")]
    pub username: Option<String>,
    #[schema(example = "Gregory")]
    pub first_name: Option<String>,
    #[schema(example = "House")]
    pub last_name: Option<String>,
    #[schema(example = "house@x.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    #[schema(example = "Cardiology")]
    pub specialization: Option<String>,
    #[schema(example = "555-2222")]
    pub phone: Option<String>,
}

fn account(
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
) -> AccountFields {
    AccountFields {
        username,
        first_name,
        last_name,
        email,
        password: password.map(Zeroizing::new),
        confirm_password: confirm_password.map(Zeroizing::new),
    }
}

impl From<PatientRegistrationForm> for RegistrationRequest {
    fn from(form: PatientRegistrationForm) -> Self {
        Self {
            account: account(
                form.username,
                form.first_name,
                form.last_name,
                form.email,
                form.password,
                form.confirm_password,
            ),
            profile: ProfileFields::Patient(PatientFields {
                date_of_birth: form.date_of_birth,
                blood_type: form.blood_type,
                phone: form.phone,
            }),
        }
    }
}

impl From<DoctorRegistrationForm> for RegistrationRequest {
    fn from(form: DoctorRegistrationForm) -> Self {
        Self {
            account: account(
                form.username,
                form.first_name,
                form.last_name,
                form.email,
                form.password,
                form.confirm_password,
            ),
            profile: ProfileFields::Doctor(DoctorFields {
                specialization: form.specialization,
                phone: form.phone,
            }),
        }
    }
}

async fn register(
    state: &HttpState,
    session: &SessionContext,
    request: RegistrationRequest,
) -> ApiResult<HttpResponse> {
    let registered = state.registration.register(request).await?;
    session.persist_identity(registered.identity_id)?;
    info!(
        identity_id = %registered.identity_id,
        role = registered.role.label(),
        "registered and signed in"
    );
    Ok(see_other(HOME_PATH))
}

/// Patient sign-up form descriptor.
#[utoipa::path(
    get,
    path = "/register/patient/",
    responses((status = 200, description = "Patient sign-up form", body = FormDescriptor)),
    tags = ["registration"],
    operation_id = "patientRegistrationForm",
    security([])
)]
#[get("/register/patient/")]
pub async fn patient_form() -> web::Json<FormDescriptor> {
    let fields = ACCOUNT_FIELDS
        .into_iter()
        .chain(["date_of_birth", "blood_type", "phone"]);
    web::Json(FormDescriptor::new(fields).with_choices("blood_type", blood_type_choices()))
}

/// Register a patient and sign them in.
#[utoipa::path(
    post,
    path = "/register/patient/",
    request_body(
        content = PatientRegistrationForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 303, description = "Registered and signed in"),
        (status = 400, description = "Field validation failed", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["registration"],
    operation_id = "registerPatient",
    security([])
)]
#[post("/register/patient/")]
pub async fn register_patient(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<PatientRegistrationForm>,
) -> ApiResult<HttpResponse> {
    register(&state, &session, form.into_inner().into()).await
}

/// Doctor sign-up form descriptor.
#[utoipa::path(
    get,
    path = "/register/doctor/",
    responses((status = 200, description = "Doctor sign-up form", body = FormDescriptor)),
    tags = ["registration"],
    operation_id = "doctorRegistrationForm",
    security([])
)]
#[get("/register/doctor/")]
pub async fn doctor_form() -> web::Json<FormDescriptor> {
    let fields = ACCOUNT_FIELDS
        .into_iter()
        .chain(["specialization", "phone"]);
    web::Json(
        FormDescriptor::new(fields).with_choices("specialization", specialization_choices()),
    )
}

/// Register a doctor and sign them in.
#[utoipa::path(
    post,
    path = "/register/doctor/",
    request_body(
        content = DoctorRegistrationForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 303, description = "Registered and signed in"),
        (status = 400, description = "Field validation failed", body = Error),
        (status = 503, description = "Identity store unavailable", body = Error)
    ),
    tags = ["registration"],
    operation_id = "registerDoctor",
    security([])
)]
#[post("/register/doctor/")]
pub async fn register_doctor(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<DoctorRegistrationForm>,
) -> ApiResult<HttpResponse> {
    register(&state, &session, form.into_inner().into()).await
}
