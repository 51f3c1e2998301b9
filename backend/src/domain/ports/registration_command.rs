//! Driving port for account registration.
//!
//! The request carries raw form values. Validation belongs to the domain so
//! every field failure can be reported together, including uniqueness checks
//! that need the repository.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::Error;

use super::RegisteredIdentity;

/// Fields common to every registration form.
#[derive(Debug, Default, Clone)]
pub struct AccountFields {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub confirm_password: Option<Zeroizing<String>>,
}

/// Patient-only registration fields.
#[derive(Debug, Default, Clone)]
pub struct PatientFields {
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub blood_type: Option<String>,
    pub phone: Option<String>,
}

/// Doctor-only registration fields.
#[derive(Debug, Default, Clone)]
pub struct DoctorFields {
    pub specialization: Option<String>,
    pub phone: Option<String>,
}

/// Role-specific half of a registration form.
#[derive(Debug, Clone)]
pub enum ProfileFields {
    Patient(PatientFields),
    Doctor(DoctorFields),
}

/// Raw registration form.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub account: AccountFields,
    pub profile: ProfileFields,
}

/// Domain use-case port for registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Validate the form, then create the identity and its profile.
    ///
    /// Validation failures return `ErrorCode::InvalidRequest` with
    /// `details.fields` listing every rejected field; nothing is written.
    async fn register(&self, request: RegistrationRequest) -> Result<RegisteredIdentity, Error>;
}
