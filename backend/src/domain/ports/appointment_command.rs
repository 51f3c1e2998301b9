//! Driving port for booking, editing and cancelling appointments.

use async_trait::async_trait;

use crate::domain::{Appointment, AppointmentId, Caller, Error};

/// Raw booking form shared by create and edit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppointmentForm {
    /// Doctor primary key.
    pub doctor: Option<String>,
    /// `YYYY-MM-DD`.
    pub appointment_date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`.
    pub appointment_time: Option<String>,
    pub reason: Option<String>,
}

/// Domain use-case port for appointment mutations.
///
/// Only the owning patient may edit or cancel; any other caller gets
/// `ErrorCode::Forbidden`. Unknown ids give `ErrorCode::NotFound`, checked
/// before ownership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentCommand: Send + Sync {
    /// Book an appointment for the calling patient.
    async fn create(&self, caller: &Caller, form: AppointmentForm) -> Result<Appointment, Error>;

    /// Replace the booking values of an owned appointment.
    async fn update(
        &self,
        caller: &Caller,
        id: AppointmentId,
        form: AppointmentForm,
    ) -> Result<Appointment, Error>;

    /// Delete an owned appointment.
    async fn cancel(&self, caller: &Caller, id: AppointmentId) -> Result<(), Error>;
}
