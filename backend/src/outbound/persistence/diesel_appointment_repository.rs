//! PostgreSQL-backed `AppointmentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentScope, NewAppointment,
};

use super::error_mapping::{DieselFailure, classify, pool_message};
use super::models::{AppointmentChangeset, AppointmentRow, NewAppointmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::appointments;

/// Diesel-backed appointment store.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentRepositoryError {
    AppointmentRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => AppointmentRepositoryError::connection(message),
        DieselFailure::ForeignKeyViolation(message) => {
            AppointmentRepositoryError::missing_reference(message)
        }
        DieselFailure::UniqueViolation(constraint) => AppointmentRepositoryError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        DieselFailure::Query(message) => AppointmentRepositoryError::query(message),
    }
}

fn to_domain(row: AppointmentRow) -> Result<Appointment, AppointmentRepositoryError> {
    Appointment::try_from(row).map_err(AppointmentRepositoryError::query)
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn find(
        &self,
        id: AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        appointments::table
            .find(id.get())
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list(
        &self,
        scope: AppointmentScope,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = appointments::table
            .select(AppointmentRow::as_select())
            .order((appointments::appointment_date.asc(), appointments::id.asc()))
            .into_boxed();
        query = match scope {
            AppointmentScope::All => query,
            AppointmentScope::Patient(id) => query.filter(appointments::patient_id.eq(id.get())),
            AppointmentScope::Doctor(id) => query.filter(appointments::doctor_id.eq(id.get())),
        };
        query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn insert(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAppointmentRow {
            patient_id: appointment.patient_id.get(),
            doctor_id: appointment.doctor_id.get(),
            appointment_date: appointment.appointment_date,
            reason: appointment.reason.as_ref(),
        };
        let stored = diesel::insert_into(appointments::table)
            .values(&row)
            .returning(AppointmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(stored)
    }

    async fn update(
        &self,
        id: AppointmentId,
        draft: AppointmentDraft,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = AppointmentChangeset {
            doctor_id: draft.doctor_id.get(),
            appointment_date: draft.appointment_date,
            reason: draft.reason.as_ref(),
        };
        diesel::update(appointments::table.find(id.get()))
            .set(&changes)
            .returning(AppointmentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(to_domain)
            .transpose()
    }

    async fn delete(&self, id: AppointmentId) -> Result<bool, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(appointments::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
