//! PostgreSQL-backed `IdentityRepository`.
//!
//! Registration writes the identity row and its profile row inside one
//! transaction, so a failed profile insert never leaves an orphan identity.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{IdentityRepository, IdentityRepositoryError, RegisteredIdentity};
use crate::domain::{
    Caller, DoctorId, EmailAddress, Identity, IdentityId, NewIdentity, NewProfile, PasswordHash,
    PatientId, Role, StoredCredentials, Username,
};

use super::error_mapping::{DieselFailure, classify, pool_message};
use super::models::{CredentialsRow, IdentityRow, NewDoctorRow, NewIdentityRow, NewPatientRow};
use super::pool::{DbPool, PoolError};
use super::schema::{doctors, identities, patients};

const USERNAME_CONSTRAINT: &str = "identities_username_key";
const EMAIL_CONSTRAINT: &str = "identities_email_key";

/// Diesel-backed identity store.
#[derive(Clone)]
pub struct DieselIdentityRepository {
    pool: DbPool,
}

impl DieselIdentityRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdentityRepositoryError {
    IdentityRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> IdentityRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => IdentityRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => match constraint.as_deref() {
            Some(EMAIL_CONSTRAINT) => IdentityRepositoryError::duplicate_email(),
            Some(USERNAME_CONSTRAINT) => IdentityRepositoryError::duplicate_username(),
            other => IdentityRepositoryError::query(format!(
                "unexpected unique violation on {}",
                other.unwrap_or("unknown constraint")
            )),
        },
        DieselFailure::ForeignKeyViolation(message) | DieselFailure::Query(message) => {
            IdentityRepositoryError::query(message)
        }
    }
}

fn new_identity_row(identity: &NewIdentity) -> NewIdentityRow<'_> {
    NewIdentityRow {
        username: identity.username.as_ref(),
        email: identity.email.as_ref(),
        password_hash: identity.password_hash.as_ref(),
        first_name: identity.first_name.as_ref(),
        last_name: identity.last_name.as_ref(),
    }
}

#[async_trait]
impl IdentityRepository for DieselIdentityRepository {
    async fn email_taken(&self, email: &EmailAddress) -> Result<bool, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            identities::table.filter(identities::email.eq(email.as_ref())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn username_taken(&self, username: &Username) -> Result<bool, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            identities::table.filter(identities::username.eq(username.as_ref())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn register(
        &self,
        identity: NewIdentity,
        profile: NewProfile,
    ) -> Result<RegisteredIdentity, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let identity_id: i64 = diesel::insert_into(identities::table)
                    .values(&new_identity_row(&identity))
                    .returning(identities::id)
                    .get_result(conn)
                    .await?;

                let role = match &profile {
                    NewProfile::Patient(patient) => {
                        let row = NewPatientRow {
                            identity_id,
                            date_of_birth: patient.date_of_birth,
                            blood_type: patient.blood_type.as_str(),
                            phone: patient.phone.as_ref(),
                        };
                        let id: i64 = diesel::insert_into(patients::table)
                            .values(&row)
                            .returning(patients::id)
                            .get_result(conn)
                            .await?;
                        Role::Patient(PatientId::new(id))
                    }
                    NewProfile::Doctor(doctor) => {
                        let row = NewDoctorRow {
                            identity_id,
                            specialization: doctor.specialization.as_str(),
                            phone: doctor.phone.as_ref(),
                        };
                        let id: i64 = diesel::insert_into(doctors::table)
                            .values(&row)
                            .returning(doctors::id)
                            .get_result(conn)
                            .await?;
                        Role::Doctor(DoctorId::new(id))
                    }
                };

                Ok(RegisteredIdentity {
                    identity_id: IdentityId::new(identity_id),
                    role,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn create_staff(
        &self,
        identity: NewIdentity,
    ) -> Result<IdentityId, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(identities::table)
            .values(&new_identity_row(&identity))
            .returning(identities::id)
            .get_result::<i64>(&mut conn)
            .await
            .map(IdentityId::new)
            .map_err(map_diesel_error)
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = identities::table
            .filter(identities::username.eq(username.as_ref()))
            .select(CredentialsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| StoredCredentials {
            identity_id: IdentityId::new(row.id),
            password_hash: PasswordHash::new(row.password_hash),
        }))
    }

    async fn find_caller(&self, id: IdentityId) -> Result<Option<Caller>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = identities::table
            .find(id.get())
            .select(IdentityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let identity = Identity::try_from(row).map_err(IdentityRepositoryError::query)?;

        let patient_id: Option<i64> = patients::table
            .filter(patients::identity_id.eq(id.get()))
            .select(patients::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let role = if let Some(patient_id) = patient_id {
            Role::Patient(PatientId::new(patient_id))
        } else {
            let doctor_id: Option<i64> = doctors::table
                .filter(doctors::identity_id.eq(id.get()))
                .select(doctors::id)
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?;
            doctor_id.map_or(Role::Staff, |doctor_id| Role::Doctor(DoctorId::new(doctor_id)))
        };

        Ok(Some(Caller { identity, role }))
    }
}
