//! Driven port for reading doctor profiles.

use async_trait::async_trait;

use crate::domain::{DirectorySearch, Doctor, DoctorId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by doctor repository adapters.
    pub enum DoctorRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "doctor repository connection failed: {message}",
        /// Query failed during execution.
        Query { message } => "doctor repository query failed: {message}",
    }
}

/// Port for doctor lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Doctor with `id`, if any.
    async fn find_by_id(&self, id: DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError>;

    /// Doctors matching `search`, ascending by id.
    async fn search(&self, search: &DirectorySearch) -> Result<Vec<Doctor>, DoctorRepositoryError>;

    /// Doctors whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DoctorRepositoryError>;
}
