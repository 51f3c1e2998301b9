//! Driving port for reading appointments.

use async_trait::async_trait;

use crate::domain::{Appointment, AppointmentId, AppointmentSummary, Caller, Error};

/// Domain use-case port for appointment reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentQuery: Send + Sync {
    /// Appointments visible to `caller`, ascending by date-time.
    ///
    /// Patients see their own, doctors see those booked with them and staff
    /// see every appointment.
    async fn list_for(&self, caller: &Caller) -> Result<Vec<AppointmentSummary>, Error>;

    /// Current values of an appointment the caller may edit.
    async fn editable(&self, caller: &Caller, id: AppointmentId) -> Result<Appointment, Error>;
}
