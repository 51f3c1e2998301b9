//! PostgreSQL-backed `DoctorRepository`.

use async_trait::async_trait;
use diesel::PgTextExpressionMethods;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{DirectorySearch, Doctor, DoctorId};

use super::error_mapping::{DieselFailure, classify, like_pattern, pool_message};
use super::models::{DoctorRow, IdentityNamesRow};
use super::pool::{DbPool, PoolError};
use super::schema::{doctors, identities};

/// Diesel-backed doctor directory.
#[derive(Clone)]
pub struct DieselDoctorRepository {
    pool: DbPool,
}

impl DieselDoctorRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DoctorRepositoryError {
    DoctorRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> DoctorRepositoryError {
    match classify(error) {
        DieselFailure::Connection(message) => DoctorRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => DoctorRepositoryError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        DieselFailure::ForeignKeyViolation(message) | DieselFailure::Query(message) => {
            DoctorRepositoryError::query(message)
        }
    }
}

fn to_domain(
    rows: Vec<(DoctorRow, IdentityNamesRow)>,
) -> Result<Vec<Doctor>, DoctorRepositoryError> {
    rows.into_iter()
        .map(|row| Doctor::try_from(row).map_err(DoctorRepositoryError::query))
        .collect()
}

#[async_trait]
impl DoctorRepository for DieselDoctorRepository {
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(DoctorRow, IdentityNamesRow)> = doctors::table
            .inner_join(identities::table)
            .filter(doctors::id.eq(id.get()))
            .select((DoctorRow::as_select(), IdentityNamesRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Doctor::try_from(row).map_err(DoctorRepositoryError::query))
            .transpose()
    }

    async fn search(&self, search: &DirectorySearch) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = doctors::table
            .inner_join(identities::table)
            .select((DoctorRow::as_select(), IdentityNamesRow::as_select()))
            .order(doctors::id.asc())
            .into_boxed();
        if let Some(term) = search.term() {
            let pattern = like_pattern(term);
            query = query.filter(
                identities::first_name
                    .ilike(pattern.clone())
                    .or(identities::last_name.ilike(pattern.clone()))
                    .or(doctors::specialization.ilike(pattern)),
            );
        }
        let rows = query.load(&mut conn).await.map_err(map_diesel_error)?;
        to_domain(rows)
    }

    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DoctorRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = doctors::table
            .inner_join(identities::table)
            .filter(doctors::id.eq_any(raw))
            .select((DoctorRow::as_select(), IdentityNamesRow::as_select()))
            .order(doctors::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_domain(rows)
    }
}
