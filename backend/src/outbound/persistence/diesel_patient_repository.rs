//! PostgreSQL-backed `PatientRepository`.

use async_trait::async_trait;
use diesel::PgTextExpressionMethods;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PatientRepository, PatientRepositoryError};
use crate::domain::{DirectorySearch, Patient, PatientId};

use super::error_mapping::{DieselFailure, classify, like_pattern, pool_message};
use super::models::{IdentityNamesRow, PatientRow};
use super::pool::{DbPool, PoolError};
use super::schema::{identities, patients};

/// Diesel-backed patient directory.
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PatientRepositoryError {
    PatientRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> PatientRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => PatientRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => PatientRepositoryError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        DieselFailure::ForeignKeyViolation(message) | DieselFailure::Query(message) => {
            PatientRepositoryError::query(message)
        }
    }
}

fn to_domain(
    rows: Vec<(PatientRow, IdentityNamesRow)>,
) -> Result<Vec<Patient>, PatientRepositoryError> {
    rows.into_iter()
        .map(|row| Patient::try_from(row).map_err(PatientRepositoryError::query))
        .collect()
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(PatientRow, IdentityNamesRow)> = patients::table
            .inner_join(identities::table)
            .filter(patients::id.eq(id.get()))
            .select((PatientRow::as_select(), IdentityNamesRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Patient::try_from(row).map_err(PatientRepositoryError::query))
            .transpose()
    }

    async fn search(
        &self,
        search: &DirectorySearch,
    ) -> Result<Vec<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = patients::table
            .inner_join(identities::table)
            .select((PatientRow::as_select(), IdentityNamesRow::as_select()))
            .order(patients::id.asc())
            .into_boxed();
        if let Some(term) = search.term() {
            let pattern = like_pattern(term);
            query = query.filter(
                identities::first_name
                    .ilike(pattern.clone())
                    .or(identities::last_name.ilike(pattern.clone()))
                    .or(patients::blood_type.ilike(pattern)),
            );
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        to_domain(rows)
    }

    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PatientRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = patients::table
            .inner_join(identities::table)
            .filter(patients::id.eq_any(raw))
            .select((PatientRow::as_select(), IdentityNamesRow::as_select()))
            .order(patients::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(rows)
    }
}
