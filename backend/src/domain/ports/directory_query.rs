//! Driving port for the patient and doctor directories.

use async_trait::async_trait;

use crate::domain::{DirectorySearch, Doctor, Error, Patient};

/// Domain use-case port for directory listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryQuery: Send + Sync {
    /// Patients matching `search` on first name, last name or blood type.
    async fn patients(&self, search: &DirectorySearch) -> Result<Vec<Patient>, Error>;

    /// Doctors matching `search` on first name, last name or specialization.
    async fn doctors(&self, search: &DirectorySearch) -> Result<Vec<Doctor>, Error>;
}
