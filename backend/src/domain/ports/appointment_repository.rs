//! Driven port for appointment persistence.

use async_trait::async_trait;

use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentScope, NewAppointment,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "appointment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "appointment repository query failed: {message}",
        /// The referenced patient or doctor no longer exists.
        MissingReference { message } =>
            "appointment references a missing record: {message}",
    }
}

/// Port for appointment storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Appointment with `id`, if any.
    async fn find(&self, id: AppointmentId)
    -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Appointments inside `scope`, ascending by appointment date-time.
    async fn list(
        &self,
        scope: AppointmentScope,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Store a new appointment and return it with its assigned id.
    async fn insert(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError>;

    /// Replace doctor, timestamp and reason. `None` when `id` does not exist.
    async fn update(
        &self,
        id: AppointmentId,
        draft: AppointmentDraft,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Hard-delete the appointment. `false` when nothing was deleted.
    async fn delete(&self, id: AppointmentId) -> Result<bool, AppointmentRepositoryError>;
}
