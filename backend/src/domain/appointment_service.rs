//! Appointment workflow: booking, editing, cancelling and listing.
//!
//! Ownership is the only authorization rule. A caller may edit or cancel an
//! appointment only when its patient profile booked it. Missing ids are
//! reported before ownership, and ownership before form validation.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tracing::{error, info};

use crate::domain::directory::{map_doctor_error, map_patient_error};
use crate::domain::ports::{
    AppointmentCommand, AppointmentForm, AppointmentQuery, AppointmentRepository,
    AppointmentRepositoryError, DoctorRepository, PatientRepository,
};
use crate::domain::validation::present;
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentReason, AppointmentScope,
    AppointmentSummary, Caller, DoctorId, Error, FieldErrorCode, FieldErrors,
    MISSING_DATE_MESSAGE, MISSING_TIME_MESSAGE, NewAppointment, Role, ScheduleError,
    merge_schedule,
};

/// Flash message for an edit attempt on someone else's appointment.
pub const EDIT_FORBIDDEN_MESSAGE: &str = "You cannot edit an appointment that is not yours.";
/// Flash message for a cancel attempt on someone else's appointment.
pub const CANCEL_FORBIDDEN_MESSAGE: &str = "You cannot cancel an appointment that is not yours.";
/// Returned when a caller without a patient profile tries to book.
pub const PATIENT_ONLY_MESSAGE: &str = "Only patients can book appointments.";
/// Flash message after a successful edit.
pub const UPDATED_MESSAGE: &str = "Your appointment has been successfully updated.";
/// Flash message after a successful cancellation.
pub const CANCELLED_MESSAGE: &str = "Your appointment has been successfully cancelled.";

const INVALID_DOCTOR_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
const NOT_FOUND_MESSAGE: &str = "appointment not found";

/// Appointment use-cases.
#[derive(Clone)]
pub struct AppointmentService<A, P, D> {
    appointments: Arc<A>,
    patients: Arc<P>,
    doctors: Arc<D>,
}

impl<A, P, D> AppointmentService<A, P, D> {
    /// Create a new service.
    pub const fn new(appointments: Arc<A>, patients: Arc<P>, doctors: Arc<D>) -> Self {
        Self {
            appointments,
            patients,
            doctors,
        }
    }
}

impl<A, P, D> AppointmentService<A, P, D>
where
    A: AppointmentRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn validate(&self, form: &AppointmentForm) -> Result<AppointmentDraft, Error> {
        let mut errors = FieldErrors::default();

        let doctor_id = match errors.require("doctor", form.doctor.as_deref()) {
            Some(raw) => self.resolve_doctor(raw, &mut errors).await?,
            None => None,
        };
        let appointment_date = parse_schedule(form, &mut errors);
        let reason = errors
            .require("reason", form.reason.as_deref())
            .and_then(|raw| AppointmentReason::new(raw).ok());

        match (doctor_id, appointment_date, reason) {
            (Some(doctor_id), Some(appointment_date), Some(reason)) if errors.is_empty() => {
                Ok(AppointmentDraft {
                    doctor_id,
                    appointment_date,
                    reason,
                })
            }
            _ => Err(errors.into_error()),
        }
    }

    async fn resolve_doctor(
        &self,
        raw: &str,
        errors: &mut FieldErrors,
    ) -> Result<Option<DoctorId>, Error> {
        let Ok(id) = raw.parse::<i64>().map(DoctorId::new) else {
            errors.push("doctor", FieldErrorCode::Invalid, INVALID_DOCTOR_MESSAGE);
            return Ok(None);
        };
        let found = self
            .doctors
            .find_by_id(id)
            .await
            .map_err(map_doctor_error)?;
        if found.is_none() {
            errors.push("doctor", FieldErrorCode::NotFound, INVALID_DOCTOR_MESSAGE);
            return Ok(None);
        }
        Ok(Some(id))
    }

    async fn owned(
        &self,
        caller: &Caller,
        id: AppointmentId,
        forbidden: &str,
    ) -> Result<Appointment, Error> {
        let appointment = self
            .appointments
            .find(id)
            .await
            .map_err(map_appointment_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND_MESSAGE))?;
        if !appointment.is_owned_by(caller.patient_id()) {
            info!(
                appointment_id = %id,
                identity_id = %caller.identity.id,
                "rejected access to another patient's appointment"
            );
            return Err(Error::forbidden(forbidden));
        }
        Ok(appointment)
    }
}

/// Parse date and time separately, then merge them.
fn parse_schedule(
    form: &AppointmentForm,
    errors: &mut FieldErrors,
) -> Option<chrono::NaiveDateTime> {
    let raw_date = present(form.appointment_date.as_deref());
    let raw_time = present(form.appointment_time.as_deref());

    let date = raw_date.and_then(|raw| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| {
                errors.push(
                    "appointment_date",
                    FieldErrorCode::Invalid,
                    "Enter a valid date.",
                );
            })
            .ok()
    });
    let time = raw_time.and_then(|raw| {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| {
                errors.push(
                    "appointment_time",
                    FieldErrorCode::Invalid,
                    "Enter a valid time.",
                );
            })
            .ok()
    });
    if (raw_date.is_some() && date.is_none()) || (raw_time.is_some() && time.is_none()) {
        return None;
    }

    match merge_schedule(date, time) {
        Ok(merged) => Some(merged),
        Err(ScheduleError::MissingTime) => {
            errors.push(
                "appointment_time",
                FieldErrorCode::Required,
                MISSING_TIME_MESSAGE,
            );
            None
        }
        Err(ScheduleError::MissingDate) => {
            errors.push(
                "appointment_date",
                FieldErrorCode::Required,
                MISSING_DATE_MESSAGE,
            );
            None
        }
        Err(ScheduleError::MissingBoth) => {
            errors.required("appointment_date");
            errors.required("appointment_time");
            None
        }
    }
}

fn map_appointment_error(err: AppointmentRepositoryError) -> Error {
    match err {
        AppointmentRepositoryError::Connection { message } => {
            error!(%message, "appointment repository unavailable");
            Error::service_unavailable("appointment store unavailable")
        }
        AppointmentRepositoryError::Query { message } => {
            error!(%message, "appointment repository query failed");
            Error::internal(format!("appointment query failed: {message}"))
        }
        AppointmentRepositoryError::MissingReference { message } => {
            info!(%message, "appointment references a vanished record");
            let mut errors = FieldErrors::default();
            errors.push("doctor", FieldErrorCode::NotFound, INVALID_DOCTOR_MESSAGE);
            errors.into_error()
        }
    }
}

#[async_trait]
impl<A, P, D> AppointmentCommand for AppointmentService<A, P, D>
where
    A: AppointmentRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn create(&self, caller: &Caller, form: AppointmentForm) -> Result<Appointment, Error> {
        let Some(patient_id) = caller.patient_id() else {
            return Err(Error::forbidden(PATIENT_ONLY_MESSAGE));
        };
        let draft = self.validate(&form).await?;
        let appointment = self
            .appointments
            .insert(NewAppointment::for_patient(patient_id, draft))
            .await
            .map_err(map_appointment_error)?;
        info!(
            appointment_id = %appointment.id,
            patient_id = %patient_id,
            doctor_id = %appointment.doctor_id,
            "appointment booked"
        );
        Ok(appointment)
    }

    async fn update(
        &self,
        caller: &Caller,
        id: AppointmentId,
        form: AppointmentForm,
    ) -> Result<Appointment, Error> {
        self.owned(caller, id, EDIT_FORBIDDEN_MESSAGE).await?;
        let draft = self.validate(&form).await?;
        let updated = self
            .appointments
            .update(id, draft)
            .await
            .map_err(map_appointment_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND_MESSAGE))?;
        info!(appointment_id = %id, "appointment updated");
        Ok(updated)
    }

    async fn cancel(&self, caller: &Caller, id: AppointmentId) -> Result<(), Error> {
        self.owned(caller, id, CANCEL_FORBIDDEN_MESSAGE).await?;
        let deleted = self
            .appointments
            .delete(id)
            .await
            .map_err(map_appointment_error)?;
        if !deleted {
            return Err(Error::not_found(NOT_FOUND_MESSAGE));
        }
        info!(appointment_id = %id, "appointment cancelled");
        Ok(())
    }
}

#[async_trait]
impl<A, P, D> AppointmentQuery for AppointmentService<A, P, D>
where
    A: AppointmentRepository,
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn list_for(&self, caller: &Caller) -> Result<Vec<AppointmentSummary>, Error> {
        let scope = match caller.role {
            Role::Patient(id) => AppointmentScope::Patient(id),
            Role::Doctor(id) => AppointmentScope::Doctor(id),
            Role::Staff => AppointmentScope::All,
        };
        let appointments = self
            .appointments
            .list(scope)
            .await
            .map_err(map_appointment_error)?;

        let patient_ids: Vec<_> = appointments
            .iter()
            .map(|a| a.patient_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let doctor_ids: Vec<_> = appointments
            .iter()
            .map(|a| a.doctor_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let patient_names: HashMap<_, _> = self
            .patients
            .find_by_ids(&patient_ids)
            .await
            .map_err(map_patient_error)?
            .into_iter()
            .map(|p| (p.id, p.display_name()))
            .collect();
        let doctor_names: HashMap<_, _> = self
            .doctors
            .find_by_ids(&doctor_ids)
            .await
            .map_err(map_doctor_error)?
            .into_iter()
            .map(|d| (d.id, d.display_name()))
            .collect();

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentSummary {
                patient_name: patient_names
                    .get(&appointment.patient_id)
                    .cloned()
                    .unwrap_or_default(),
                doctor_name: doctor_names
                    .get(&appointment.doctor_id)
                    .cloned()
                    .unwrap_or_default(),
                appointment,
            })
            .collect())
    }

    async fn editable(&self, caller: &Caller, id: AppointmentId) -> Result<Appointment, Error> {
        self.owned(caller, id, EDIT_FORBIDDEN_MESSAGE).await
    }
}
