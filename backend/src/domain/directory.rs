//! Patient and doctor directories with substring search.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::domain::Error;
use crate::domain::ports::{
    DirectoryQuery, DoctorRepository, DoctorRepositoryError, PatientRepository,
    PatientRepositoryError,
};
use crate::domain::{Doctor, Patient};

/// Optional case-insensitive search term.
///
/// A blank term is treated as absent, so the listing returns every row.
///
/// # Examples
/// ```
/// use clinic::domain::DirectorySearch;
///
/// let search = DirectorySearch::new(Some("  Cardio "));
/// assert_eq!(search.term(), Some("Cardio"));
/// assert!(search.matches(["Cardiology"]));
/// assert!(DirectorySearch::new(Some("   ")).term().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySearch {
    term: Option<String>,
    folded: Option<String>,
}

impl DirectorySearch {
    /// Build a search from the raw `q` parameter.
    pub fn new(raw: Option<&str>) -> Self {
        let term = raw.map(str::trim).filter(|t| !t.is_empty());
        Self {
            term: term.map(str::to_owned),
            folded: term.map(str::to_lowercase),
        }
    }

    /// Trimmed search term, if any.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    /// Whether any of `fields` contains the term, ignoring case.
    ///
    /// Always true when there is no term.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        match self.folded.as_deref() {
            None => true,
            Some(needle) => fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(needle)),
        }
    }
}

impl Patient {
    /// Search fields: first name, last name and blood type.
    pub fn matches(&self, search: &DirectorySearch) -> bool {
        search.matches([
            self.first_name.as_ref(),
            self.last_name.as_ref(),
            self.blood_type.as_str(),
        ])
    }
}

impl Doctor {
    /// Search fields: first name, last name and specialization.
    pub fn matches(&self, search: &DirectorySearch) -> bool {
        search.matches([
            self.first_name.as_ref(),
            self.last_name.as_ref(),
            self.specialization.as_str(),
        ])
    }
}

/// Directory use-cases over the patient and doctor repositories.
#[derive(Clone)]
pub struct DirectoryService<P, D> {
    patients: Arc<P>,
    doctors: Arc<D>,
}

impl<P, D> DirectoryService<P, D> {
    /// Create a new service.
    pub const fn new(patients: Arc<P>, doctors: Arc<D>) -> Self {
        Self { patients, doctors }
    }
}

#[async_trait]
impl<P, D> DirectoryQuery for DirectoryService<P, D>
where
    P: PatientRepository,
    D: DoctorRepository,
{
    async fn patients(&self, search: &DirectorySearch) -> Result<Vec<Patient>, Error> {
        self.patients
            .search(search)
            .await
            .map_err(map_patient_error)
    }

    async fn doctors(&self, search: &DirectorySearch) -> Result<Vec<Doctor>, Error> {
        self.doctors.search(search).await.map_err(map_doctor_error)
    }
}

pub(crate) fn map_patient_error(err: PatientRepositoryError) -> Error {
    match err {
        PatientRepositoryError::Connection { message } => {
            error!(%message, "patient repository unavailable");
            Error::service_unavailable("patient directory unavailable")
        }
        PatientRepositoryError::Query { message } => {
            error!(%message, "patient repository query failed");
            Error::internal(format!("patient query failed: {message}"))
        }
    }
}

pub(crate) fn map_doctor_error(err: DoctorRepositoryError) -> Error {
    match err {
        DoctorRepositoryError::Connection { message } => {
            error!(%message, "doctor repository unavailable");
            Error::service_unavailable("doctor directory unavailable")
        }
        DoctorRepositoryError::Query { message } => {
            error!(%message, "doctor repository query failed");
            Error::internal(format!("doctor query failed: {message}"))
        }
    }
}
