//! Driven port for reading patient profiles.

use async_trait::async_trait;

use crate::domain::{DirectorySearch, Patient, PatientId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message } => "patient repository connection failed: {message}",
        /// Query failed during execution.
        Query { message } => "patient repository query failed: {message}",
    }
}

/// Port for patient lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Patient with `id`, if any.
    async fn find_by_id(&self, id: PatientId) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Patients matching `search`, ascending by id.
    async fn search(
        &self,
        search: &DirectorySearch,
    ) -> Result<Vec<Patient>, PatientRepositoryError>;

    /// Patients whose id is in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, PatientRepositoryError>;
}
