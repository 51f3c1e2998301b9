//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are called by
//! inbound adapters. Driven ports (`*Repository`, [`CredentialHasher`]) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_command;
mod appointment_query;
mod appointment_repository;
mod caller_query;
mod credential_hasher;
mod directory_query;
mod doctor_repository;
mod identity_repository;
mod login_service;
mod patient_repository;
mod registration_command;

#[cfg(test)]
pub use appointment_command::MockAppointmentCommand;
pub use appointment_command::{AppointmentCommand, AppointmentForm};
#[cfg(test)]
pub use appointment_query::MockAppointmentQuery;
pub use appointment_query::AppointmentQuery;
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{AppointmentRepository, AppointmentRepositoryError};
#[cfg(test)]
pub use caller_query::MockCallerQuery;
pub use caller_query::CallerQuery;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use directory_query::MockDirectoryQuery;
pub use directory_query::DirectoryQuery;
#[cfg(test)]
pub use doctor_repository::MockDoctorRepository;
pub use doctor_repository::{DoctorRepository, DoctorRepositoryError};
#[cfg(test)]
pub use identity_repository::MockIdentityRepository;
pub use identity_repository::{IdentityRepository, IdentityRepositoryError, RegisteredIdentity};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use registration_command::MockRegistrationCommand;
pub use registration_command::{
    AccountFields, DoctorFields, PatientFields, ProfileFields, RegistrationCommand,
    RegistrationRequest,
};
