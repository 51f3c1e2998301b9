//! Appointment listing and booking handlers.
//!
//! ```text
//! GET  /appointments/
//! GET  /appointments/add/
//! POST /appointments/add/
//!      doctor=1&appointment_date=2025-06-01&appointment_time=09:00&reason=checkup
//! GET  /appointments/{id}/edit/
//! POST /appointments/{id}/edit/
//! POST /appointments/{id}/cancel/
//! ```
//!
//! Every route needs a signed-in caller. Touching someone else's appointment
//! is answered with an error flash and a redirect to the listing, not a
//! `403`, so a browser always lands on a page it can render.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::AppointmentForm;
use crate::domain::{
    Appointment, AppointmentId, AppointmentSummary, CANCELLED_MESSAGE, Caller, DirectorySearch,
    Error, ErrorCode, Role, UPDATED_MESSAGE,
};

use super::ApiResult;
use super::flash::FlashMessage;
use super::forms::{ChoiceOption, FormDescriptor};
use super::navigation::{APPOINTMENTS_PATH, HOME_PATH, require_caller, see_other};
use super::session::SessionContext;
use super::state::HttpState;

const APPOINTMENT_FIELDS: [&str; 4] = ["doctor", "appointment_date", "appointment_time", "reason"];

/// Booking form body shared by create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct AppointmentFormBody {
    /// Doctor id.
    #[schema(example = "1")]
    pub doctor: Option<String>,
    #[schema(example = "2025-06-01")]
    pub appointment_date: Option<String>,
    #[schema(example = "09:00")]
    pub appointment_time: Option<String>,
    #[schema(example = "checkup")]
    pub reason: Option<String>,
}

impl From<AppointmentFormBody> for AppointmentForm {
    fn from(body: AppointmentFormBody) -> Self {
        Self {
            doctor: body.doctor,
            appointment_date: body.appointment_date,
            appointment_time: body.appointment_time,
            reason: body.reason,
        }
    }
}

impl From<&Appointment> for AppointmentFormBody {
    fn from(appointment: &Appointment) -> Self {
        Self {
            doctor: Some(appointment.doctor_id.get().to_string()),
            appointment_date: Some(appointment.appointment_date.format("%Y-%m-%d").to_string()),
            appointment_time: Some(appointment.appointment_date.format("%H:%M").to_string()),
            reason: Some(appointment.reason.to_string()),
        }
    }
}

/// Appointment row in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: i64,
    /// Patient profile id of the booking owner.
    pub patient_id: i64,
    /// Patient's full name.
    #[schema(example = "Alice Smith")]
    pub patient_name: String,
    /// Doctor profile id.
    pub doctor_id: i64,
    /// Doctor's name with the `Dr.` prefix.
    #[schema(example = "Dr. Gregory House")]
    pub doctor_name: String,
    /// Naive local timestamp, ISO 8601 without an offset.
    #[schema(value_type = String, example = "2025-06-01T09:00:00")]
    pub appointment_date: NaiveDateTime,
    #[schema(example = "checkup")]
    pub reason: String,
}

impl From<AppointmentSummary> for AppointmentResponse {
    fn from(summary: AppointmentSummary) -> Self {
        let AppointmentSummary {
            appointment,
            patient_name,
            doctor_name,
        } = summary;
        Self {
            id: appointment.id.get(),
            patient_id: appointment.patient_id.get(),
            patient_name,
            doctor_id: appointment.doctor_id.get(),
            doctor_name,
            appointment_date: appointment.appointment_date,
            reason: appointment.reason.to_string(),
        }
    }
}

/// Payload of `GET /appointments/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentListResponse {
    /// Rows visible to the caller, earliest first.
    pub appointments: Vec<AppointmentResponse>,
    /// Caller holds a patient profile and may book.
    pub is_patient: bool,
    pub is_doctor: bool,
    /// Flash messages queued by earlier requests; consumed by this read.
    pub messages: Vec<FlashMessage>,
}

/// Payload of `GET /appointments/{id}/edit/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentEditPage {
    pub id: i64,
    /// Current values for pre-populating the form.
    pub values: AppointmentFormBody,
    pub form: FormDescriptor,
}

async fn booking_form(state: &HttpState) -> ApiResult<FormDescriptor> {
    let doctors = state.directory.doctors(&DirectorySearch::default()).await?;
    let options = doctors
        .iter()
        .map(|doctor| ChoiceOption::new(doctor.id.get().to_string(), doctor.display_name()))
        .collect();
    Ok(FormDescriptor::new(APPOINTMENT_FIELDS).with_choices("doctor", options))
}

/// Turn a `forbidden` outcome into an error flash plus a redirect to the
/// listing. Other outcomes pass through.
fn flash_forbidden(
    session: &SessionContext,
    result: ApiResult<HttpResponse>,
) -> ApiResult<HttpResponse> {
    match result {
        Err(err) if err.code() == ErrorCode::Forbidden => {
            session.push_flash(FlashMessage::error(err.message()))?;
            Ok(see_other(APPOINTMENTS_PATH))
        }
        other => other,
    }
}

macro_rules! signed_in {
    ($request:expr, $state:expr, $session:expr) => {
        match require_caller(&$request, &$state, &$session).await? {
            Ok(caller) => caller,
            Err(redirect) => return Ok(redirect),
        }
    };
}

/// Appointments visible to the caller, soonest first.
#[utoipa::path(
    get,
    path = "/appointments/",
    responses(
        (
            status = 200,
            description = "Appointments visible to the caller",
            body = AppointmentListResponse
        ),
        (status = 303, description = "Not signed in; redirect to login"),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "listAppointments"
)]
#[get("/appointments/")]
pub async fn list_appointments(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    let appointments = state.appointments_query.list_for(&caller).await?;
    Ok(HttpResponse::Ok().json(AppointmentListResponse {
        appointments: appointments
            .into_iter()
            .map(AppointmentResponse::from)
            .collect(),
        is_patient: matches!(caller.role, Role::Patient(_)),
        is_doctor: matches!(caller.role, Role::Doctor(_)),
        messages: session.take_flashes(),
    }))
}

/// Booking form with the doctor choices.
#[utoipa::path(
    get,
    path = "/appointments/add/",
    responses(
        (status = 200, description = "Booking form", body = FormDescriptor),
        (status = 303, description = "Not signed in, or not a patient")
    ),
    tags = ["appointments"],
    operation_id = "appointmentForm"
)]
#[get("/appointments/add/")]
pub async fn add_appointment_form(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    if caller.patient_id().is_none() {
        return Ok(see_other(HOME_PATH));
    }
    Ok(HttpResponse::Ok().json(booking_form(&state).await?))
}

/// Book an appointment for the signed-in patient.
#[utoipa::path(
    post,
    path = "/appointments/add/",
    request_body(content = AppointmentFormBody, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Booked; or not signed in; or not a patient"),
        (status = 400, description = "Field validation failed", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "addAppointment"
)]
#[post("/appointments/add/")]
pub async fn add_appointment(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<AppointmentFormBody>,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    if caller.patient_id().is_none() {
        debug!(identity_id = %caller.identity.id, "non-patient sent to home from booking");
        return Ok(see_other(HOME_PATH));
    }
    state
        .appointments
        .create(&caller, form.into_inner().into())
        .await?;
    Ok(see_other(APPOINTMENTS_PATH))
}

async fn edit_page(
    state: &HttpState,
    caller: &Caller,
    id: AppointmentId,
) -> ApiResult<HttpResponse> {
    let appointment = state.appointments_query.editable(caller, id).await?;
    Ok(HttpResponse::Ok().json(AppointmentEditPage {
        id: appointment.id.get(),
        values: AppointmentFormBody::from(&appointment),
        form: booking_form(state).await?,
    }))
}

/// Current values of an appointment the caller owns.
#[utoipa::path(
    get,
    path = "/appointments/{id}/edit/",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Edit form with current values", body = AppointmentEditPage),
        (status = 303, description = "Not signed in, or not the owner (error flash queued)"),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "appointmentEditForm"
)]
#[get("/appointments/{id}/edit/")]
pub async fn edit_appointment_form(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    let id = AppointmentId::new(path.into_inner());
    flash_forbidden(&session, edit_page(&state, &caller, id).await)
}

/// Change an appointment the caller owns.
#[utoipa::path(
    post,
    path = "/appointments/{id}/edit/",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body(content = AppointmentFormBody, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Updated, or not the owner; see the queued flash"),
        (status = 400, description = "Field validation failed", body = Error),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "editAppointment"
)]
#[post("/appointments/{id}/edit/")]
pub async fn edit_appointment(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    form: web::Form<AppointmentFormBody>,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    let id = AppointmentId::new(path.into_inner());
    let outcome = match state
        .appointments
        .update(&caller, id, form.into_inner().into())
        .await
    {
        Ok(_) => session
            .push_flash(FlashMessage::success(UPDATED_MESSAGE))
            .map(|()| see_other(APPOINTMENTS_PATH)),
        Err(err) => Err(err),
    };
    flash_forbidden(&session, outcome)
}

/// Cancel (delete) an appointment the caller owns.
#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel/",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 303, description = "Cancelled, or not the owner; see the queued flash"),
        (status = 404, description = "No such appointment", body = Error)
    ),
    tags = ["appointments"],
    operation_id = "cancelAppointment"
)]
#[post("/appointments/{id}/cancel/")]
pub async fn cancel_appointment(
    request: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let caller = signed_in!(request, state, session);
    let id = AppointmentId::new(path.into_inner());
    let outcome = match state.appointments.cancel(&caller, id).await {
        Ok(()) => session
            .push_flash(FlashMessage::success(CANCELLED_MESSAGE))
            .map(|()| see_other(APPOINTMENTS_PATH)),
        Err(err) => Err(err),
    };
    flash_forbidden(&session, outcome)
}
